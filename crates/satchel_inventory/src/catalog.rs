//! # Item Catalog
//!
//! Read-only game data the placement engine consults: item templates,
//! equip-slot categories, container capacities, the armoury map and the
//! starting-gear tables.
//!
//! ## File format
//!
//! ```toml
//! [[capacities]]
//! container = "inventory0"
//! slots = 35
//!
//! [[templates]]
//! id = 4551
//! name = "Potion"
//! max_stack = 99
//!
//! [[equip_slot_categories]]
//! id = 12
//! slots = ["right_ring", "left_ring"]
//!
//! [[armoury]]
//! use_category = 40
//! container = "armoury_rings"
//! ```
//!
//! A catalog is validated once when it is built; the inventory never has to
//! second-guess it afterwards.

use crate::error::{CatalogError, InventoryError, InventoryResult};
use satchel_shared::{ContainerType, EquipSlot, TemplateId};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// Immutable description of an item kind.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct ItemTemplate {
    /// Template identifier.
    pub id: TemplateId,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Maximum units per stack. 1 means the item never stacks.
    #[serde(default = "default_max_stack")]
    pub max_stack: u32,
    /// Equip-slot category, 0 when the item can't be equipped.
    #[serde(default)]
    pub equip_slot_category: u32,
    /// Primary model id.
    #[serde(default)]
    pub model_primary: u64,
    /// Secondary model id.
    #[serde(default)]
    pub model_secondary: u64,
    /// UI category used to pick an armoury chest.
    #[serde(default)]
    pub use_category: u32,
}

const fn default_max_stack() -> u32 {
    1
}

impl ItemTemplate {
    /// Creates a non-equippable template.
    #[must_use]
    pub fn new(id: TemplateId, max_stack: u32) -> Self {
        Self {
            id,
            name: String::new(),
            max_stack,
            equip_slot_category: 0,
            model_primary: 0,
            model_secondary: 0,
            use_category: 0,
        }
    }

    /// Sets the display name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Makes the template equippable into the given category, sorted into
    /// armoury chests by `use_category`.
    #[must_use]
    pub const fn with_equip(mut self, equip_slot_category: u32, use_category: u32) -> Self {
        self.equip_slot_category = equip_slot_category;
        self.use_category = use_category;
        self
    }

    /// Sets the model ids.
    #[must_use]
    pub const fn with_models(mut self, primary: u64, secondary: u64) -> Self {
        self.model_primary = primary;
        self.model_secondary = secondary;
        self
    }

    /// Returns true if more than one unit fits into a stack.
    #[inline]
    #[must_use]
    pub const fn is_stackable(&self) -> bool {
        self.max_stack > 1
    }

    /// Returns true if the template names an equip-slot category.
    #[inline]
    #[must_use]
    pub const fn is_equippable(&self) -> bool {
        self.equip_slot_category != 0
    }
}

/// Player sex, selecting a starting-gear set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sex {
    /// Male model set.
    Male,
    /// Female model set.
    Female,
}

/// Starting armour for one race and sex.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
pub struct StarterGear {
    /// Body piece.
    pub body: TemplateId,
    /// Gloves.
    pub hands: TemplateId,
    /// Leg piece.
    pub legs: TemplateId,
    /// Boots.
    pub feet: TemplateId,
}

impl StarterGear {
    /// The four pieces in equip order.
    #[must_use]
    pub const fn pieces(&self) -> [TemplateId; 4] {
        [self.body, self.hands, self.legs, self.feet]
    }
}

/// Starting armour per sex for one race.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
pub struct Race {
    /// Race id.
    pub id: u32,
    /// Gear for male characters.
    pub male: StarterGear,
    /// Gear for female characters.
    pub female: StarterGear,
}

impl Race {
    /// Gear for the given sex.
    #[must_use]
    pub const fn gear(&self, sex: Sex) -> &StarterGear {
        match sex {
            Sex::Male => &self.male,
            Sex::Female => &self.female,
        }
    }
}

/// Starting weapon for one class job.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
pub struct ClassJob {
    /// Class job id.
    pub id: u32,
    /// Weapon template.
    pub weapon: TemplateId,
}

#[derive(Debug, Deserialize)]
struct EquipSlotCategoryRow {
    id: u32,
    slots: Vec<EquipSlot>,
}

#[derive(Debug, Deserialize)]
struct CapacityRow {
    container: ContainerType,
    slots: u16,
}

#[derive(Debug, Deserialize)]
struct ArmouryRow {
    use_category: u32,
    container: ContainerType,
}

/// On-disk catalog layout.
#[derive(Debug, Default, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    capacities: Vec<CapacityRow>,
    #[serde(default)]
    templates: Vec<ItemTemplate>,
    #[serde(default)]
    equip_slot_categories: Vec<EquipSlotCategoryRow>,
    #[serde(default)]
    armoury: Vec<ArmouryRow>,
    #[serde(default)]
    races: Vec<Race>,
    #[serde(default)]
    class_jobs: Vec<ClassJob>,
}

/// Validated, read-only game data.
#[derive(Debug, Default)]
pub struct Catalog {
    templates: HashMap<TemplateId, Arc<ItemTemplate>>,
    equip_slot_categories: HashMap<u32, Vec<EquipSlot>>,
    capacities: HashMap<ContainerType, u16>,
    armoury: HashMap<u32, ContainerType>,
    races: HashMap<u32, Race>,
    class_jobs: HashMap<u32, ClassJob>,
}

impl Catalog {
    /// Starts building a catalog in code.
    #[must_use]
    pub fn builder() -> CatalogBuilder {
        CatalogBuilder::default()
    }

    /// Parses and validates a catalog from TOML text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text does not parse or fails validation.
    pub fn from_toml_str(text: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = toml::from_str(text)?;
        Self::from_file(file)
    }

    /// Reads, parses and validates a catalog file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file can't be read, does not parse, or fails
    /// validation.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let text = std::fs::read_to_string(path)?;
        let catalog = Self::from_toml_str(&text)?;
        tracing::info!(
            templates = catalog.templates.len(),
            races = catalog.races.len(),
            class_jobs = catalog.class_jobs.len(),
            "catalog loaded"
        );
        Ok(catalog)
    }

    fn from_file(file: CatalogFile) -> Result<Self, CatalogError> {
        let capacities: HashMap<_, _> = file
            .capacities
            .into_iter()
            .map(|row| (row.container, row.slots))
            .collect();
        for container in ContainerType::ALL {
            if !capacities.contains_key(&container) {
                return Err(CatalogError::MissingCapacity(container));
            }
        }
        let equipped_capacity = capacities
            .get(&ContainerType::Equipped)
            .copied()
            .unwrap_or(0);

        let mut equip_slot_categories = HashMap::new();
        for row in file.equip_slot_categories {
            if row.slots.is_empty()
                || row.slots.iter().any(|s| s.index() >= equipped_capacity)
            {
                return Err(CatalogError::InvalidEquipSlotCategory(row.id));
            }
            equip_slot_categories.insert(row.id, row.slots);
        }

        let mut templates = HashMap::new();
        for template in file.templates {
            if template.max_stack == 0 {
                return Err(CatalogError::InvalidMaxStack(template.id));
            }
            if template.is_equippable()
                && !equip_slot_categories.contains_key(&template.equip_slot_category)
            {
                return Err(CatalogError::UnknownEquipSlotCategory {
                    template_id: template.id,
                    category: template.equip_slot_category,
                });
            }
            let id = template.id;
            if templates.insert(id, Arc::new(template)).is_some() {
                return Err(CatalogError::DuplicateTemplate(id));
            }
        }

        let mut armoury = HashMap::new();
        for row in file.armoury {
            if !row.container.is_armoury() {
                return Err(CatalogError::NotAnArmoury {
                    use_category: row.use_category,
                    container: row.container,
                });
            }
            armoury.insert(row.use_category, row.container);
        }

        let starting_gear = file
            .races
            .iter()
            .flat_map(|race| race.male.pieces().into_iter().chain(race.female.pieces()))
            .chain(file.class_jobs.iter().map(|job| job.weapon));
        for template_id in starting_gear {
            if !templates.contains_key(&template_id) {
                return Err(CatalogError::UnknownStartingGear(template_id));
            }
        }

        Ok(Self {
            templates,
            equip_slot_categories,
            capacities,
            armoury,
            races: file.races.into_iter().map(|r| (r.id, r)).collect(),
            class_jobs: file.class_jobs.into_iter().map(|c| (c.id, c)).collect(),
        })
    }

    /// Looks up a template.
    #[inline]
    #[must_use]
    pub fn template(&self, id: TemplateId) -> Option<&Arc<ItemTemplate>> {
        self.templates.get(&id)
    }

    /// Looks up a template, failing with a validation error.
    ///
    /// # Errors
    ///
    /// Returns [`InventoryError::UnknownTemplate`] if the id is unknown.
    pub fn require_template(&self, id: TemplateId) -> InventoryResult<Arc<ItemTemplate>> {
        self.templates
            .get(&id)
            .cloned()
            .ok_or(InventoryError::UnknownTemplate(id))
    }

    /// Legal equip slots for a template, in preference order.
    ///
    /// Returns `None` for templates that can't be equipped.
    #[must_use]
    pub fn equip_slots(&self, template: &ItemTemplate) -> Option<&[EquipSlot]> {
        if !template.is_equippable() {
            return None;
        }
        self.equip_slot_categories
            .get(&template.equip_slot_category)
            .map(Vec::as_slice)
    }

    /// Number of slots in a container category.
    #[inline]
    #[must_use]
    pub fn capacity(&self, container: ContainerType) -> u16 {
        self.capacities.get(&container).copied().unwrap_or(0)
    }

    /// Armoury chest that holds gear of a use category.
    #[inline]
    #[must_use]
    pub fn armoury_for(&self, use_category: u32) -> Option<ContainerType> {
        self.armoury.get(&use_category).copied()
    }

    /// Looks up a race.
    #[must_use]
    pub fn race(&self, id: u32) -> Option<&Race> {
        self.races.get(&id)
    }

    /// Looks up a class job.
    #[must_use]
    pub fn class_job(&self, id: u32) -> Option<&ClassJob> {
        self.class_jobs.get(&id)
    }

    /// Number of templates.
    #[must_use]
    pub fn template_count(&self) -> usize {
        self.templates.len()
    }
}

/// Builds a [`Catalog`] in code, with the same validation as the file loader.
#[derive(Debug, Default)]
pub struct CatalogBuilder {
    file: CatalogFile,
}

impl CatalogBuilder {
    /// Sets the capacity of one container category.
    #[must_use]
    pub fn capacity(mut self, container: ContainerType, slots: u16) -> Self {
        self.file.capacities.push(CapacityRow { container, slots });
        self
    }

    /// Adds a template.
    #[must_use]
    pub fn template(mut self, template: ItemTemplate) -> Self {
        self.file.templates.push(template);
        self
    }

    /// Adds an equip-slot category.
    #[must_use]
    pub fn equip_slot_category(mut self, id: u32, slots: &[EquipSlot]) -> Self {
        self.file.equip_slot_categories.push(EquipSlotCategoryRow {
            id,
            slots: slots.to_vec(),
        });
        self
    }

    /// Maps a use category to an armoury chest.
    #[must_use]
    pub fn armoury(mut self, use_category: u32, container: ContainerType) -> Self {
        self.file.armoury.push(ArmouryRow {
            use_category,
            container,
        });
        self
    }

    /// Adds a race.
    #[must_use]
    pub fn race(mut self, race: Race) -> Self {
        self.file.races.push(race);
        self
    }

    /// Adds a class job.
    #[must_use]
    pub fn class_job(mut self, id: u32, weapon: TemplateId) -> Self {
        self.file.class_jobs.push(ClassJob { id, weapon });
        self
    }

    /// Validates and builds the catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the data fails validation.
    pub fn build(self) -> Result<Catalog, CatalogError> {
        Catalog::from_file(self.file)
    }
}
