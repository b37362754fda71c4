mod amo;
mod contact;
mod email;
mod fxa;
mod vpn_waitlist;

pub use amo::*;
pub use contact::*;
pub use email::*;
pub use fxa::*;
pub use vpn_waitlist::*;
