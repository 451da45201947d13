mod command_input;
mod filter_input;
mod form;
mod input;
mod key_result;

pub use command_input::{CommandEvent, CommandInput};
pub use filter_input::{FilterEvent, FilterInput};
pub use form::{Form, FormEvent};
pub use input::{InputResult, TextInput};
pub use key_result::KeyResult;
