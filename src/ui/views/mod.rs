mod admin;
mod consultations;
mod detail;
mod directory;
mod list;
mod login;
mod profile;
mod prompt;
mod records;
mod register;

pub use admin::{Pending, Users};
pub use consultations::Consultations;
pub use detail::{field, DetailView};
pub use directory::Consultants;
pub use list::{ListView, Listing};
pub use login::LoginView;
pub use profile::ProfileView;
pub use prompt::{optional, push_prompt, OnSubmit, PromptView};
pub use records::{FeedbackList, Reports, Visits};
pub use register::RegisterView;
