//! Light registry and light source behaviors
//!
//! The registry is the render collaborator's view of scene lighting: a flat,
//! handle-addressed table per light kind. Lights themselves are scene node
//! behaviors that register on entering the tree, refresh their world-space
//! data every update, and unregister on leaving, so the registry never holds
//! an entry for a node that is gone.

use slotmap::SlotMap;
use thiserror::Error;

use crate::foundation::logging::warn;
use crate::foundation::math::{constants, Mat4, Vec3};
use crate::lighting::shadow::ShadowCascades;
use crate::scene::{NodeBehavior, NodeContext};

slotmap::new_key_type! {
    /// Stable handle to a registered directional light
    pub struct DirectionalLightId;
    /// Stable handle to a registered point light
    pub struct PointLightId;
}

/// Errors from registry lookups
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LightError {
    /// The handle is stale or was already unregistered
    #[error("light handle is stale or already unregistered")]
    NotFound,
}

/// Registry entry for a directional light
#[derive(Debug, Clone, PartialEq)]
pub struct DirectionalLightData {
    /// Linear RGB color and intensity
    pub color: Vec3,
    /// Unit direction from the scene toward the light
    pub direction: Vec3,
    /// Per-cascade `(projection, view)` pairs, ordered near to far. Empty
    /// when the light casts no shadows.
    pub cascades: Vec<(Mat4, Mat4)>,
}

/// Registry entry for a point light
#[derive(Debug, Clone, PartialEq)]
pub struct PointLightData {
    /// Linear RGB color and intensity
    pub color: Vec3,
    /// Constant, linear, and quadratic attenuation coefficients
    pub attenuation: Vec3,
    /// World-space position
    pub position: Vec3,
}

/// Flat tables of the scene's active lights
pub struct LightRegistry {
    directional: SlotMap<DirectionalLightId, DirectionalLightData>,
    point: SlotMap<PointLightId, PointLightData>,
}

impl LightRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            directional: SlotMap::with_key(),
            point: SlotMap::with_key(),
        }
    }

    /// Register a directional light
    pub fn register_directional(&mut self, data: DirectionalLightData) -> DirectionalLightId {
        self.directional.insert(data)
    }

    /// Unregister a directional light
    pub fn unregister_directional(
        &mut self,
        id: DirectionalLightId,
    ) -> Result<DirectionalLightData, LightError> {
        self.directional.remove(id).ok_or(LightError::NotFound)
    }

    /// Look up a directional light
    pub fn directional(&self, id: DirectionalLightId) -> Result<&DirectionalLightData, LightError> {
        self.directional.get(id).ok_or(LightError::NotFound)
    }

    /// Look up a directional light for mutation
    pub fn directional_mut(
        &mut self,
        id: DirectionalLightId,
    ) -> Result<&mut DirectionalLightData, LightError> {
        self.directional.get_mut(id).ok_or(LightError::NotFound)
    }

    /// Iterate all directional lights
    pub fn iter_directional(
        &self,
    ) -> impl Iterator<Item = (DirectionalLightId, &DirectionalLightData)> {
        self.directional.iter()
    }

    /// Number of registered directional lights
    pub fn directional_count(&self) -> usize {
        self.directional.len()
    }

    /// Register a point light
    pub fn register_point(&mut self, data: PointLightData) -> PointLightId {
        self.point.insert(data)
    }

    /// Unregister a point light
    pub fn unregister_point(&mut self, id: PointLightId) -> Result<PointLightData, LightError> {
        self.point.remove(id).ok_or(LightError::NotFound)
    }

    /// Look up a point light
    pub fn point(&self, id: PointLightId) -> Result<&PointLightData, LightError> {
        self.point.get(id).ok_or(LightError::NotFound)
    }

    /// Look up a point light for mutation
    pub fn point_mut(&mut self, id: PointLightId) -> Result<&mut PointLightData, LightError> {
        self.point.get_mut(id).ok_or(LightError::NotFound)
    }

    /// Iterate all point lights
    pub fn iter_point(&self) -> impl Iterator<Item = (PointLightId, &PointLightData)> {
        self.point.iter()
    }

    /// Number of registered point lights
    pub fn point_count(&self) -> usize {
        self.point.len()
    }
}

impl Default for LightRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Directional light source behavior.
///
/// The light direction is the node's world position normalized (the node sits
/// "at" the sun, infinitely far in spirit), so orbiting the node orbits the
/// light. With cascades enabled, the active camera's frustum is refit every
/// update and the resulting matrices published to the registry.
pub struct DirectionalLight {
    color: Vec3,
    cascades: Option<ShadowCascades>,
    id: Option<DirectionalLightId>,
}

impl DirectionalLight {
    /// A directional light without shadows
    pub fn new(color: Vec3) -> Self {
        Self {
            color,
            cascades: None,
            id: None,
        }
    }

    /// A shadow-casting directional light with `cascade_count` cascades
    pub fn with_cascades(color: Vec3, cascade_count: usize) -> Self {
        Self {
            color,
            cascades: Some(ShadowCascades::new(cascade_count)),
            id: None,
        }
    }

    /// Registry handle, present while the node is in the tree
    pub fn id(&self) -> Option<DirectionalLightId> {
        self.id
    }

    /// The fitted cascades, if shadow casting is enabled
    pub fn cascades(&self) -> Option<&ShadowCascades> {
        self.cascades.as_ref()
    }

    fn direction(ctx: &NodeContext<'_>) -> Vec3 {
        ctx.world_position()
            .try_normalize(constants::EPSILON)
            .unwrap_or_else(Vec3::y)
    }
}

impl NodeBehavior for DirectionalLight {
    fn on_added_to_scene(&mut self, ctx: &mut NodeContext<'_>) {
        let direction = Self::direction(ctx);
        self.id = Some(ctx.lights_mut().register_directional(DirectionalLightData {
            color: self.color,
            direction,
            cascades: Vec::new(),
        }));
    }

    fn on_removed_from_scene(&mut self, ctx: &mut NodeContext<'_>) {
        if let Some(id) = self.id.take() {
            if ctx.lights_mut().unregister_directional(id).is_err() {
                warn!("directional light was already unregistered");
            }
        }
    }

    fn on_update(&mut self, ctx: &mut NodeContext<'_>) {
        let Some(id) = self.id else {
            return;
        };
        let direction = Self::direction(ctx);
        if let Some(cascades) = &mut self.cascades {
            if let Some(camera) = ctx.camera() {
                cascades.fit_corners(camera, direction);
            }
        }
        if let Ok(data) = ctx.lights_mut().directional_mut(id) {
            data.direction = direction;
            if let Some(cascades) = &self.cascades {
                data.cascades = cascades.matrices();
            }
        }
    }
}

/// Point light source behavior: registers on entering the tree and keeps its
/// registry position in sync with the node's world position.
pub struct PointLight {
    color: Vec3,
    attenuation: Vec3,
    id: Option<PointLightId>,
}

impl PointLight {
    /// Create a point light with the given color and constant/linear/
    /// quadratic attenuation coefficients
    pub fn new(color: Vec3, attenuation: Vec3) -> Self {
        Self {
            color,
            attenuation,
            id: None,
        }
    }

    /// Registry handle, present while the node is in the tree
    pub fn id(&self) -> Option<PointLightId> {
        self.id
    }
}

impl NodeBehavior for PointLight {
    fn on_added_to_scene(&mut self, ctx: &mut NodeContext<'_>) {
        let position = ctx.world_position();
        self.id = Some(ctx.lights_mut().register_point(PointLightData {
            color: self.color,
            attenuation: self.attenuation,
            position,
        }));
    }

    fn on_removed_from_scene(&mut self, ctx: &mut NodeContext<'_>) {
        if let Some(id) = self.id.take() {
            if ctx.lights_mut().unregister_point(id).is_err() {
                warn!("point light was already unregistered");
            }
        }
    }

    fn on_update(&mut self, ctx: &mut NodeContext<'_>) {
        let Some(id) = self.id else {
            return;
        };
        let position = ctx.world_position();
        if let Ok(data) = ctx.lights_mut().point_mut(id) {
            data.position = position;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_round_trip() {
        let mut registry = LightRegistry::new();
        let id = registry.register_point(PointLightData {
            color: Vec3::new(1.0, 0.5, 0.2),
            attenuation: Vec3::new(1.0, 0.1, 0.01),
            position: Vec3::zeros(),
        });
        assert_eq!(registry.point_count(), 1);
        assert_eq!(registry.point(id).unwrap().color.x, 1.0);

        registry.unregister_point(id).unwrap();
        assert_eq!(registry.point_count(), 0);
        assert_eq!(registry.point(id), Err(LightError::NotFound));
    }

    #[test]
    fn test_stale_directional_handle() {
        let mut registry = LightRegistry::new();
        let id = registry.register_directional(DirectionalLightData {
            color: Vec3::new(1.0, 1.0, 1.0),
            direction: Vec3::y(),
            cascades: Vec::new(),
        });
        registry.unregister_directional(id).unwrap();
        assert_eq!(
            registry.unregister_directional(id),
            Err(LightError::NotFound)
        );
    }
}
