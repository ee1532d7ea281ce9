//! Frame decoding and the landmark-provider seam.
//!
//! The face detector, face mesh and pose models are external collaborators.
//! This module only defines what they return ([`FrameLandmarks`]) and how the
//! service asks for it ([`LandmarkProvider`]).

pub mod error;
pub mod factory;
pub mod frame;
pub mod landmarks;

#[cfg(feature = "remote-landmarks")]
pub mod remote;

pub use error::{VisionError, VisionResult};
pub use factory::provider_from_settings;
pub use frame::{Frame, LumaHistogram};
pub use landmarks::{
    FaceDetection, FixedLandmarkProvider, FrameLandmarks, Landmark, LandmarkProvider,
    NullLandmarkProvider, PixelBoundingBox, RelativeBoundingBox,
};

#[cfg(feature = "remote-landmarks")]
pub use remote::RemoteLandmarkProvider;
