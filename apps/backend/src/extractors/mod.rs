pub mod device;
pub mod session_actor;
pub mod validated_json;

pub use device::DeviceId;
pub use session_actor::SessionActor;
pub use validated_json::ValidatedJson;
