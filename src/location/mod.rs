pub mod attachment;
pub mod lookup;

pub use attachment::{Coordinates, LocationAttachment, LocationFix};
pub use lookup::{LocationLookup, LookupOutcome, LookupTicket};
