//! Entities that carry recyclers, loaded or unloaded.
//!
//! A [`World`] owns every entity the host has handed over. Loaded entities
//! hold live [`Recycler`]s and tick through the foreground path; unloaded
//! entities hold [`PartSnapshot`]s and tick through the background path.
//! [`World::unload`] and [`World::load`] move an entity between the two
//! representations, carrying each recycler's enabled flag across unchanged.
//!
//! The world never decides when an entity loads or unloads; the host calls
//! the transitions explicitly.

use std::sync::Arc;

use slotmap::SlotMap;

use crate::catalog::{Catalog, DeviceDefinition};
use crate::executor::{Recycler, background_update};
use crate::id::EntityId;
use crate::pool::ResourcePool;
use crate::snapshot::{ModuleSnapshot, PartSnapshot};

// ---------------------------------------------------------------------------
// Loaded representation
// ---------------------------------------------------------------------------

/// One module on a loaded part.
#[derive(Debug, Clone)]
pub enum LoadedModule {
    Recycler(Recycler),
    /// A module this crate does not simulate, kept verbatim so unloading
    /// restores it.
    Other(ModuleSnapshot),
}

/// A part on a loaded entity.
#[derive(Debug, Clone)]
pub struct LoadedPart {
    pub part_name: String,
    pub modules: Vec<LoadedModule>,
}

impl LoadedPart {
    /// A part carrying a single freshly spawned recycler.
    pub fn with_recycler(definition: Arc<DeviceDefinition>) -> Self {
        Self {
            part_name: definition.part_name.clone(),
            modules: vec![LoadedModule::Recycler(Recycler::new(definition))],
        }
    }

    pub fn recyclers(&self) -> impl Iterator<Item = &Recycler> {
        self.modules.iter().filter_map(|m| match m {
            LoadedModule::Recycler(r) => Some(r),
            LoadedModule::Other(_) => None,
        })
    }

    pub fn recyclers_mut(&mut self) -> impl Iterator<Item = &mut Recycler> {
        self.modules.iter_mut().filter_map(|m| match m {
            LoadedModule::Recycler(r) => Some(r),
            LoadedModule::Other(_) => None,
        })
    }

    fn to_snapshot(&self) -> PartSnapshot {
        let modules = self
            .modules
            .iter()
            .map(|m| match m {
                LoadedModule::Recycler(r) => r.snapshot(),
                LoadedModule::Other(s) => s.clone(),
            })
            .collect();
        PartSnapshot {
            part_name: self.part_name.clone(),
            modules,
        }
    }

    fn from_snapshot(
        entity: EntityId,
        part: &PartSnapshot,
        catalog: &Catalog,
    ) -> Result<Self, WorldError> {
        let mut modules = Vec::with_capacity(part.modules.len());
        for module in &part.modules {
            if module.is_recycler() {
                let definition =
                    catalog
                        .get(&part.part_name)
                        .ok_or_else(|| WorldError::UnknownPart {
                            entity,
                            part_name: part.part_name.clone(),
                        })?;
                modules.push(LoadedModule::Recycler(Recycler::with_state(
                    Arc::clone(definition),
                    module.to_state(),
                )));
            } else {
                modules.push(LoadedModule::Other(module.clone()));
            }
        }
        Ok(Self {
            part_name: part.part_name.clone(),
            modules,
        })
    }
}

// ---------------------------------------------------------------------------
// Entity
// ---------------------------------------------------------------------------

/// Whether an entity is under foreground or background simulation.
#[derive(Debug, Clone)]
pub enum EntityState {
    Loaded(Vec<LoadedPart>),
    Unloaded(Vec<PartSnapshot>),
}

#[derive(Debug, Clone)]
pub struct Entity {
    pub name: String,
    pub state: EntityState,
}

/// Per-recycler summary returned by [`Entity::partial_data`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct PartialData {
    pub is_enabled: bool,
}

impl Entity {
    pub fn is_loaded(&self) -> bool {
        matches!(self.state, EntityState::Loaded(_))
    }

    /// Enabled flag of every recycler on the entity, from live state when
    /// loaded and from snapshots otherwise. Read-only.
    pub fn partial_data(&self) -> Vec<PartialData> {
        match &self.state {
            EntityState::Loaded(parts) => parts
                .iter()
                .flat_map(LoadedPart::recyclers)
                .map(|r| PartialData {
                    is_enabled: r.state().is_enabled(),
                })
                .collect(),
            EntityState::Unloaded(parts) => parts
                .iter()
                .flat_map(PartSnapshot::recyclers)
                .map(|m| PartialData {
                    is_enabled: m.to_state().is_enabled(),
                })
                .collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Errors and reports
// ---------------------------------------------------------------------------

/// Errors from world lookups and load/unload transitions.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum WorldError {
    #[error("entity {0:?} not found")]
    EntityNotFound(EntityId),
    #[error("entity {0:?} is already loaded")]
    AlreadyLoaded(EntityId),
    #[error("entity {0:?} is already unloaded")]
    AlreadyUnloaded(EntityId),
    #[error("entity {entity:?} has a recycler on part '{part_name}' with no catalog entry")]
    UnknownPart { entity: EntityId, part_name: String },
}

/// Counts from one [`World::step`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepReport {
    /// Enabled recyclers ticked on the foreground path.
    pub foreground: usize,
    /// Enabled recyclers ticked on the background path.
    pub background: usize,
    /// Recyclers skipped because they were disabled.
    pub disabled: usize,
    /// Background recyclers skipped because their part has no definition.
    pub missing_definitions: usize,
}

// ---------------------------------------------------------------------------
// World
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct World {
    entities: SlotMap<EntityId, Entity>,
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn_loaded(&mut self, name: &str, parts: Vec<LoadedPart>) -> EntityId {
        self.entities.insert(Entity {
            name: name.to_string(),
            state: EntityState::Loaded(parts),
        })
    }

    pub fn spawn_unloaded(&mut self, name: &str, parts: Vec<PartSnapshot>) -> EntityId {
        self.entities.insert(Entity {
            name: name.to_string(),
            state: EntityState::Unloaded(parts),
        })
    }

    pub fn remove(&mut self, id: EntityId) -> Option<Entity> {
        self.entities.remove(id)
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(id)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.entities.keys()
    }

    /// Live recyclers of a loaded entity, for enable/disable/toggle actions.
    pub fn recyclers_mut(
        &mut self,
        id: EntityId,
    ) -> Result<impl Iterator<Item = &mut Recycler>, WorldError> {
        let entity = self
            .entities
            .get_mut(id)
            .ok_or(WorldError::EntityNotFound(id))?;
        match &mut entity.state {
            EntityState::Loaded(parts) => Ok(parts.iter_mut().flat_map(LoadedPart::recyclers_mut)),
            EntityState::Unloaded(_) => Err(WorldError::AlreadyUnloaded(id)),
        }
    }

    /// Partial-state query for one entity.
    pub fn partial_data(&self, id: EntityId) -> Result<Vec<PartialData>, WorldError> {
        self.entities
            .get(id)
            .map(Entity::partial_data)
            .ok_or(WorldError::EntityNotFound(id))
    }

    /// Replace live recyclers with snapshots of their state.
    pub fn unload(&mut self, id: EntityId) -> Result<(), WorldError> {
        let entity = self
            .entities
            .get_mut(id)
            .ok_or(WorldError::EntityNotFound(id))?;
        let EntityState::Loaded(parts) = &entity.state else {
            return Err(WorldError::AlreadyUnloaded(id));
        };
        let snapshots: Vec<PartSnapshot> = parts.iter().map(LoadedPart::to_snapshot).collect();
        entity.state = EntityState::Unloaded(snapshots);
        tracing::info!(?id, name = %entity.name, "entity unloaded");
        Ok(())
    }

    /// Rebuild live recyclers from snapshots. The entity is left unloaded if
    /// any recycler's part is missing from `catalog`.
    pub fn load(&mut self, id: EntityId, catalog: &Catalog) -> Result<(), WorldError> {
        let entity = self
            .entities
            .get_mut(id)
            .ok_or(WorldError::EntityNotFound(id))?;
        let EntityState::Unloaded(snapshots) = &entity.state else {
            return Err(WorldError::AlreadyLoaded(id));
        };
        let parts = snapshots
            .iter()
            .map(|p| LoadedPart::from_snapshot(id, p, catalog))
            .collect::<Result<Vec<_>, _>>()?;
        entity.state = EntityState::Loaded(parts);
        tracing::info!(?id, name = %entity.name, "entity loaded");
        Ok(())
    }

    /// Advance every entity by `elapsed` simulated seconds: the foreground
    /// path for loaded entities, the background path for unloaded ones.
    pub fn step<P: ResourcePool + ?Sized>(
        &mut self,
        pool: &mut P,
        catalog: &Catalog,
        elapsed: f64,
    ) -> StepReport {
        let mut report = StepReport::default();
        for (id, entity) in self.entities.iter_mut() {
            match &mut entity.state {
                EntityState::Loaded(parts) => {
                    for recycler in parts.iter_mut().flat_map(LoadedPart::recyclers_mut) {
                        match recycler.fixed_update(pool, id, elapsed) {
                            Some(_) => report.foreground += 1,
                            None => report.disabled += 1,
                        }
                    }
                }
                EntityState::Unloaded(parts) => {
                    for part in parts.iter() {
                        let mut recyclers = part.recyclers().peekable();
                        if recyclers.peek().is_none() {
                            continue;
                        }
                        let Some(definition) = catalog.get(&part.part_name) else {
                            let skipped = recyclers.count();
                            tracing::warn!(
                                ?id,
                                part = %part.part_name,
                                skipped,
                                "no definition for unloaded recycler part"
                            );
                            report.missing_definitions += skipped;
                            continue;
                        };
                        for module in recyclers {
                            let ran =
                                background_update(&definition.config, module, pool, id, elapsed);
                            match ran {
                                Some(_) => report.background += 1,
                                None => report.disabled += 1,
                            }
                        }
                    }
                }
            }
        }
        tracing::debug!(
            foreground = report.foreground,
            background = report.background,
            disabled = report.disabled,
            elapsed,
            "world step"
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogBuilder;
    use crate::config::ENERGY_RESOURCE;
    use crate::pool::ResourceCache;
    use crate::snapshot::RECYCLER_MODULE;
    use crate::state::RuntimeState;
    use crate::test_utils::*;

    fn catalog() -> Catalog {
        let mut builder = CatalogBuilder::new();
        builder.register((*water_definition()).clone()).unwrap();
        builder.build()
    }

    fn stock(pool: &mut ResourceCache, id: EntityId) {
        pool.set(id, "WasteWater", 50.0, 100.0);
        pool.set(id, ENERGY_RESOURCE, 50.0, 100.0);
        pool.set(id, "Water", 0.0, 100.0);
    }

    fn two_recycler_ship(catalog: &Catalog) -> Vec<LoadedPart> {
        let def = catalog.get("water-recycler").unwrap();
        vec![
            LoadedPart::with_recycler(Arc::clone(def)),
            LoadedPart::with_recycler(Arc::clone(def)),
        ]
    }

    // -----------------------------------------------------------------------
    // Test 1: Unload/load round trip keeps enabled flags
    // -----------------------------------------------------------------------
    #[test]
    fn enabled_flags_survive_transition() {
        let catalog = catalog();
        let mut world = World::new();
        let id = world.spawn_loaded("station", two_recycler_ship(&catalog));

        world.recyclers_mut(id).unwrap().nth(1).unwrap().state_mut().disable();
        let before = world.partial_data(id).unwrap();
        assert_eq!(
            before,
            vec![PartialData { is_enabled: true }, PartialData { is_enabled: false }]
        );

        world.unload(id).unwrap();
        assert!(!world.entity(id).unwrap().is_loaded());
        assert_eq!(world.partial_data(id).unwrap(), before);

        world.load(id, &catalog).unwrap();
        assert!(world.entity(id).unwrap().is_loaded());
        assert_eq!(world.partial_data(id).unwrap(), before);
    }

    #[test]
    fn other_modules_survive_transition() {
        let catalog = catalog();
        let mut world = World::new();
        let part = PartSnapshot::new(
            "water-recycler",
            vec![
                ModuleSnapshot::new("Scrubber"),
                ModuleSnapshot::from_state(&RuntimeState::new(true)),
            ],
        );
        let id = world.spawn_unloaded("probe", vec![part.clone()]);

        world.load(id, &catalog).unwrap();
        world.unload(id).unwrap();
        match &world.entity(id).unwrap().state {
            EntityState::Unloaded(parts) => assert_eq!(parts, &vec![part]),
            EntityState::Loaded(_) => panic!("expected unloaded"),
        }
    }

    // -----------------------------------------------------------------------
    // Test 2: Transition errors
    // -----------------------------------------------------------------------
    #[test]
    fn double_transitions_rejected() {
        let catalog = catalog();
        let mut world = World::new();
        let id = world.spawn_loaded("station", two_recycler_ship(&catalog));

        assert_eq!(world.load(id, &catalog), Err(WorldError::AlreadyLoaded(id)));
        world.unload(id).unwrap();
        assert_eq!(world.unload(id), Err(WorldError::AlreadyUnloaded(id)));
        assert!(matches!(
            world.recyclers_mut(id),
            Err(WorldError::AlreadyUnloaded(_))
        ));
    }

    #[test]
    fn unknown_part_leaves_entity_unloaded() {
        let mut world = World::new();
        let part = PartSnapshot::new(
            "mystery-box",
            vec![ModuleSnapshot::from_state(&RuntimeState::new(true))],
        );
        let id = world.spawn_unloaded("probe", vec![part]);

        let err = world.load(id, &catalog()).unwrap_err();
        assert_eq!(
            err,
            WorldError::UnknownPart {
                entity: id,
                part_name: "mystery-box".to_string()
            }
        );
        assert!(!world.entity(id).unwrap().is_loaded());
    }

    #[test]
    fn removed_entity_not_found() {
        let catalog = catalog();
        let mut world = World::new();
        let id = world.spawn_loaded("station", two_recycler_ship(&catalog));
        assert!(world.remove(id).is_some());
        assert!(world.is_empty());
        assert_eq!(world.partial_data(id), Err(WorldError::EntityNotFound(id)));
        assert_eq!(world.unload(id), Err(WorldError::EntityNotFound(id)));
    }

    // -----------------------------------------------------------------------
    // Test 3: Step dispatches by entity state
    // -----------------------------------------------------------------------
    #[test]
    fn step_runs_both_paths() {
        let catalog = catalog();
        let mut world = World::new();
        let loaded = world.spawn_loaded("station", two_recycler_ship(&catalog));
        let unloaded = world.spawn_loaded("lander", two_recycler_ship(&catalog));
        world.recyclers_mut(unloaded).unwrap().next().unwrap().state_mut().disable();
        world.unload(unloaded).unwrap();

        let mut pool = ResourceCache::new();
        stock(&mut pool, loaded);
        stock(&mut pool, unloaded);

        let report = world.step(&mut pool, &catalog, 1.0);
        assert_eq!(
            report,
            StepReport {
                foreground: 2,
                background: 1,
                disabled: 1,
                missing_definitions: 0,
            }
        );
        // Two recyclers at full rate versus one.
        assert_eq!(pool.amount(loaded, "Water"), 1.0);
        assert_eq!(pool.amount(unloaded, "Water"), 0.5);
    }

    #[test]
    fn step_skips_parts_without_definition() {
        let mut world = World::new();
        let part = PartSnapshot::new(
            "mystery-box",
            vec![ModuleSnapshot::from_state(&RuntimeState::new(true))],
        );
        let id = world.spawn_unloaded("probe", vec![part]);
        let mut pool = ResourceCache::new();
        stock(&mut pool, id);

        let report = world.step(&mut pool, &catalog(), 1.0);
        assert_eq!(report.missing_definitions, 1);
        assert_eq!(report.background, 0);
        assert_eq!(pool.amount(id, "WasteWater"), 50.0);
    }

    #[test]
    fn partial_data_ignores_other_modules() {
        let mut world = World::new();
        let mut foreign = ModuleSnapshot::new("Scrubber");
        foreign.set_bool("is_enabled", true);
        let mut recycler = ModuleSnapshot::new(RECYCLER_MODULE);
        recycler.set_bool("is_enabled", false);
        let id = world.spawn_unloaded(
            "probe",
            vec![PartSnapshot::new("water-recycler", vec![foreign, recycler])],
        );
        assert_eq!(
            world.partial_data(id).unwrap(),
            vec![PartialData { is_enabled: false }]
        );
    }
}
