pub mod invoice;
pub mod user;

pub use invoice::{Invoice, InvoiceLine, InvoiceStatus};
pub use user::User;
