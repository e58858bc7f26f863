//! # TUI Components
//!
//! UI components for the terminal interface.
//!
//! ### Stateless Components (Props-Based Rendering)
//!
//! - `TitleBar`: Top status bar showing the language pair and status
//!
//! ### Stateful Components (Event-Driven)
//!
//! - `TextField`: Editable field used for configuration and source text
//! - `LanguagePicker`: Filterable overlay for choosing a language
//!
//! Components receive external data as props (struct fields or
//! constructor parameters), not by reaching into `App`. Each file holds the
//! component's state, events, rendering and tests.
//!
//! ```text
//! components/
//! ├── mod.rs             (this file)
//! ├── title_bar.rs       (Top status bar)
//! ├── language_picker.rs (Language overlay)
//! └── text_field/        (Text input with wrapping and cursor tracking)
//! ```

mod title_bar;
pub use title_bar::TitleBar;

pub mod text_field;
pub use text_field::{FieldEvent, TextField};
pub mod language_picker;
pub use language_picker::{LanguagePicker, LanguagePickerState, PickerEvent, PickerTarget};
