pub mod error;
pub mod form;
pub mod html;
pub mod notify;
pub mod screen;
pub mod value;
pub mod widget;

pub use error::{FormError, RenderError, ScreenError, SubmitError};
pub use form::{Form, FormState, SubmitHandler, SubmitOutcome};
pub use html::HtmlRenderer;
pub use notify::{Notification, NotificationBus, Topic};
pub use screen::{Actions, ListState, ResourceScreen, ScreenOptions, ScreenView};
pub use value::{FieldError, FormRecord, FormValue, RawInput};
pub use widget::{Control, InputAffordance, SelectOption, SubmitControl, Widget, WidgetRenderer};
