//! # Translator
//!
//! The Translation Service seam: a trait the core talks to, the typed
//! results it returns, and the Azure Translator REST implementation.

pub mod azure;
pub mod service;
pub mod types;

pub use azure::AzureTranslator;
pub use service::{TranslationRequest, TranslationService};
pub use types::{Detection, DetectionAlternative, Language, TranslatedItem, Translation};
