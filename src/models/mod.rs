pub mod language;
pub mod operation;
pub mod validation;
pub mod vehicle;

pub use language::Language;
pub use operation::OperationState;
pub use validation::{ValidationError, Validator};
pub use vehicle::{slugify, CreateVehicleRequest, Vehicle, VehicleKind, VehicleResponse};
