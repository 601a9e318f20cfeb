mod banner;
mod command_input;
mod form;
mod input;
mod search_input;

pub use banner::Banner;
pub use command_input::{CommandEvent, CommandInput};
pub use form::{Form, FormEvent, FormField};
pub use input::{Charset, InputResult, TextInput};
pub use search_input::{SearchEvent, SearchInput};

/// What a component did with a key: swallowed it, turned it into an event for
/// the owning view, or left it for the next handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyResult<T> {
  Handled,
  Event(T),
  NotHandled,
}
