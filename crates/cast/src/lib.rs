pub mod dispatcher;

pub use dispatcher::CastDispatcher;
pub use debridcast_core::{
    clean_title, CastConfig, CastError, CastOutcome, Caster, Device, DeviceProtocol,
    MediaReference,
};
