use crate::design::{CompiledShipStats, DesignResolver};
use crate::id::DesignId;
use std::collections::HashMap;

/// Highest warp tier an engine can reach.
pub const MAX_WARP: u32 = 10;

/// Errors raised while registering or freezing designs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("design '{0}' is already registered")]
    DuplicateDesign(String),
    #[error("design '{design}' has warp speed {warp}, above the maximum of {MAX_WARP}")]
    WarpOutOfRange { design: String, warp: u32 },
    #[error("design '{design}' has a colony module but no colonist capacity")]
    ColonyModuleWithoutCapacity { design: String },
}

/// Builder for constructing an immutable [`DesignRegistry`].
/// Designs are registered, then the builder is validated and frozen.
#[derive(Debug, Default)]
pub struct DesignRegistryBuilder {
    designs: Vec<(DesignId, CompiledShipStats)>,
    index: HashMap<DesignId, usize>,
}

impl DesignRegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a design under `name`. Returns its id.
    pub fn register(
        &mut self,
        name: &str,
        stats: CompiledShipStats,
    ) -> Result<DesignId, RegistryError> {
        let id = DesignId::new(name);
        if self.index.contains_key(&id) {
            return Err(RegistryError::DuplicateDesign(name.to_string()));
        }
        self.index.insert(id.clone(), self.designs.len());
        self.designs.push((id.clone(), stats));
        Ok(id)
    }

    /// Replace the stats of an already-registered design.
    pub fn replace(&mut self, id: &DesignId, stats: CompiledShipStats) -> bool {
        match self.index.get(id) {
            Some(&i) => {
                self.designs[i].1 = stats;
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.designs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.designs.is_empty()
    }

    /// Validate every design and freeze the registry.
    pub fn build(self) -> Result<DesignRegistry, RegistryError> {
        for (id, stats) in &self.designs {
            if stats.warp_speed > MAX_WARP {
                return Err(RegistryError::WarpOutOfRange {
                    design: id.to_string(),
                    warp: stats.warp_speed,
                });
            }
            if stats.has_colony_module && stats.colonist_capacity == 0 {
                return Err(RegistryError::ColonyModuleWithoutCapacity {
                    design: id.to_string(),
                });
            }
        }
        Ok(DesignRegistry {
            designs: self.designs,
            index: self.index,
        })
    }
}

/// Frozen design table shared by every game on the engine.
#[derive(Debug, Clone, Default)]
pub struct DesignRegistry {
    designs: Vec<(DesignId, CompiledShipStats)>,
    index: HashMap<DesignId, usize>,
}

impl DesignRegistry {
    pub fn get(&self, id: &DesignId) -> Option<&CompiledShipStats> {
        self.index.get(id).map(|&i| &self.designs[i].1)
    }

    pub fn contains(&self, id: &DesignId) -> bool {
        self.index.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.designs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.designs.is_empty()
    }

    /// Designs in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (&DesignId, &CompiledShipStats)> {
        self.designs.iter().map(|(id, stats)| (id, stats))
    }
}

impl DesignResolver for DesignRegistry {
    fn resolve(&self, design: &DesignId) -> Option<CompiledShipStats> {
        self.get(design).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(warp: u32) -> CompiledShipStats {
        CompiledShipStats {
            warp_speed: warp,
            ..CompiledShipStats::FALLBACK
        }
    }

    #[test]
    fn register_and_lookup() {
        let mut b = DesignRegistryBuilder::new();
        let scout = b.register("scout", stats(9)).unwrap();
        let freighter = b.register("freighter", stats(6)).unwrap();
        let reg = b.build().unwrap();

        assert_eq!(reg.len(), 2);
        assert_eq!(reg.get(&scout).unwrap().warp_speed, 9);
        assert_eq!(reg.resolve(&freighter).unwrap().warp_speed, 6);
        assert!(!reg.contains(&DesignId::new("battleship")));
    }

    #[test]
    fn duplicate_name_is_rejected() {
        let mut b = DesignRegistryBuilder::new();
        b.register("scout", stats(9)).unwrap();
        let err = b.register("scout", stats(5)).unwrap_err();
        assert_eq!(err, RegistryError::DuplicateDesign("scout".to_string()));
    }

    #[test]
    fn warp_above_ten_fails_build() {
        let mut b = DesignRegistryBuilder::new();
        b.register("impossible", stats(11)).unwrap();
        assert!(matches!(
            b.build(),
            Err(RegistryError::WarpOutOfRange { warp: 11, .. })
        ));
    }

    #[test]
    fn colony_module_requires_capacity() {
        let mut b = DesignRegistryBuilder::new();
        b.register(
            "broken_colony",
            CompiledShipStats {
                has_colony_module: true,
                colonist_capacity: 0,
                ..CompiledShipStats::FALLBACK
            },
        )
        .unwrap();
        assert!(matches!(
            b.build(),
            Err(RegistryError::ColonyModuleWithoutCapacity { .. })
        ));
    }

    #[test]
    fn replace_updates_stats() {
        let mut b = DesignRegistryBuilder::new();
        let id = b.register("scout", stats(5)).unwrap();
        assert!(b.replace(&id, stats(8)));
        assert!(!b.replace(&DesignId::new("missing"), stats(1)));
        let reg = b.build().unwrap();
        assert_eq!(reg.get(&id).unwrap().warp_speed, 8);
        let order: Vec<_> = reg.iter().map(|(id, _)| id.as_str().to_string()).collect();
        assert_eq!(order, vec!["scout"]);
    }
}
