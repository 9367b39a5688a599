//! Lights and cascaded shadow fitting

mod light;
mod shadow;

pub use light::{
    DirectionalLight, DirectionalLightData, DirectionalLightId, LightError, LightRegistry,
    PointLight, PointLightData, PointLightId,
};
pub use shadow::ShadowCascades;
