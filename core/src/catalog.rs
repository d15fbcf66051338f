//! Upgrade catalog — the static, read-only economy definition.
//!
//! The on-disk document is a tree of groups → subgroups → upgrades plus the
//! bulk-buy options offered to the player. It is loaded once, validated, and
//! flattened so upgrades can be indexed densely by `upgrade_id`.
//!
//! Validation rules (all violations are `InvalidCatalog`):
//!   - at least one group; group 0 is free (unlock cost 0)
//!   - every group has at least one subgroup
//!   - upgrade ids are exactly 0..n with no gaps or duplicates
//!   - cost exponent is finite and > 1 (the bulk price divides by e - 1)
//!   - costs and production are finite and >= 0
//!   - requirements only reference strictly lower upgrade ids, amount >= 1
//!   - bulk-buy options are non-empty and all >= 1
//!
//! A cap of 0 is valid and means the upgrade is locked: it can never be bought.

use crate::{
    error::{IdleError, IdleResult},
    types::{GroupIndex, SubgroupIndex, UpgradeId},
};
use serde::{Deserialize, Serialize};
use std::path::Path;

// ── Document shape ─────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogFile {
    pub groups: Vec<GroupFile>,
    pub bulk_buy_options: Vec<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupFile {
    pub group_name: String,
    pub unlock_cost: f64,
    pub upgrade_subgroups: Vec<SubgroupFile>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubgroupFile {
    pub subgroup_name: String,
    pub upgrades: Vec<UpgradeFile>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpgradeFile {
    pub upgrade_id: UpgradeId,
    pub upgrade_name: String,
    pub base_cost: f64,
    pub cost_increase_exponent: f64,
    pub upgrade_cap: u32,
    pub atom_production: f64,
    #[serde(default)]
    pub requires: Vec<(UpgradeId, u32)>,
}

// ── Validated catalog ──────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct Requirement {
    pub upgrade_id: UpgradeId,
    pub minimum_purchased: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpgradeDef {
    pub upgrade_id: UpgradeId,
    pub name: String,
    pub base_cost: f64,
    pub cost_exponent: f64,
    /// 0 means locked.
    pub purchase_cap: u32,
    pub atom_production: f64,
    pub requirements: Vec<Requirement>,
    pub group: GroupIndex,
    pub subgroup: SubgroupIndex,
}

impl UpgradeDef {
    pub fn is_locked(&self) -> bool {
        self.purchase_cap == 0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Subgroup {
    pub name: String,
    /// Upgrade ids in display order.
    pub upgrades: Vec<UpgradeId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    pub id: GroupIndex,
    pub name: String,
    pub unlock_cost: f64,
    pub subgroups: Vec<Subgroup>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Catalog {
    groups: Vec<Group>,
    /// Indexed by upgrade id.
    upgrades: Vec<UpgradeDef>,
    bulk_buy_options: Vec<u32>,
}

impl Catalog {
    /// Load and validate `<data_dir>/catalog.json`.
    pub fn load(data_dir: impl AsRef<Path>) -> IdleResult<Self> {
        let path = data_dir.as_ref().join("catalog.json");
        let content = std::fs::read_to_string(&path)
            .map_err(|e| anyhow::anyhow!("Cannot read {}: {e}", path.display()))?;
        Self::from_json(&content)
    }

    pub fn from_json(json: &str) -> IdleResult<Self> {
        let file: CatalogFile = serde_json::from_str(json)
            .map_err(|e| IdleError::invalid_catalog(format!("malformed document: {e}")))?;
        Self::from_file(file)
    }

    pub fn from_file(file: CatalogFile) -> IdleResult<Self> {
        if file.groups.is_empty() {
            return Err(IdleError::invalid_catalog("catalog has no groups"));
        }
        if file.bulk_buy_options.is_empty() {
            return Err(IdleError::invalid_catalog("bulk_buy_options is empty"));
        }
        if file.bulk_buy_options.contains(&0) {
            return Err(IdleError::invalid_catalog("bulk_buy_options contains 0"));
        }

        let total: usize = file
            .groups
            .iter()
            .flat_map(|g| &g.upgrade_subgroups)
            .map(|s| s.upgrades.len())
            .sum();
        let mut groups = Vec::with_capacity(file.groups.len());
        let mut slots: Vec<Option<UpgradeDef>> = vec![None; total];

        for (g_idx, g) in file.groups.into_iter().enumerate() {
            if !g.unlock_cost.is_finite() || g.unlock_cost < 0.0 {
                return Err(IdleError::invalid_catalog(format!(
                    "group '{}' has invalid unlock cost {}",
                    g.group_name, g.unlock_cost
                )));
            }
            if g_idx == 0 && g.unlock_cost != 0.0 {
                return Err(IdleError::invalid_catalog(format!(
                    "starting group '{}' must have unlock cost 0, got {}",
                    g.group_name, g.unlock_cost
                )));
            }
            if g.upgrade_subgroups.is_empty() {
                return Err(IdleError::invalid_catalog(format!(
                    "group '{}' has no subgroups",
                    g.group_name
                )));
            }

            let mut subgroups = Vec::with_capacity(g.upgrade_subgroups.len());
            for (s_idx, s) in g.upgrade_subgroups.into_iter().enumerate() {
                let mut ids = Vec::with_capacity(s.upgrades.len());
                for u in s.upgrades {
                    let def = validate_upgrade(u, g_idx, s_idx)?;
                    let id = def.upgrade_id;
                    if id >= total {
                        return Err(IdleError::invalid_catalog(format!(
                            "upgrade id {id} out of range for {total} upgrades"
                        )));
                    }
                    if slots[id].is_some() {
                        return Err(IdleError::invalid_catalog(format!(
                            "duplicate upgrade id {id}"
                        )));
                    }
                    ids.push(id);
                    slots[id] = Some(def);
                }
                subgroups.push(Subgroup { name: s.subgroup_name, upgrades: ids });
            }

            groups.push(Group {
                id: g_idx,
                name: g.group_name,
                unlock_cost: g.unlock_cost,
                subgroups,
            });
        }

        let mut upgrades = Vec::with_capacity(slots.len());
        for (id, slot) in slots.into_iter().enumerate() {
            match slot {
                Some(def) => upgrades.push(def),
                None => {
                    return Err(IdleError::invalid_catalog(format!(
                        "upgrade ids are not contiguous: {id} is missing"
                    )))
                }
            }
        }

        log::debug!(
            "catalog: loaded {} groups, {} upgrades",
            groups.len(),
            upgrades.len()
        );

        Ok(Self { groups, upgrades, bulk_buy_options: file.bulk_buy_options })
    }

    /// Small built-in catalog used by tests and the runner's smoke mode.
    pub fn default_test() -> IdleResult<Self> {
        Self::from_json(TEST_CATALOG_JSON)
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub fn group(&self, group: GroupIndex) -> IdleResult<&Group> {
        self.groups.get(group).ok_or(IdleError::UnknownGroup { group })
    }

    pub fn upgrades(&self) -> &[UpgradeDef] {
        &self.upgrades
    }

    pub fn upgrade(&self, upgrade_id: UpgradeId) -> IdleResult<&UpgradeDef> {
        self.upgrades
            .get(upgrade_id)
            .ok_or(IdleError::UnknownUpgrade { upgrade_id })
    }

    pub fn upgrade_count(&self) -> usize {
        self.upgrades.len()
    }

    pub fn bulk_buy_options(&self) -> &[u32] {
        &self.bulk_buy_options
    }

    pub fn is_bulk_option(&self, quantity: u32) -> bool {
        self.bulk_buy_options.contains(&quantity)
    }

    /// Groups that start unlocked (unlock cost 0). Always includes group 0.
    pub fn free_groups(&self) -> impl Iterator<Item = GroupIndex> + '_ {
        self.groups
            .iter()
            .filter(|g| g.unlock_cost == 0.0)
            .map(|g| g.id)
    }
}

fn validate_upgrade(u: UpgradeFile, group: GroupIndex, subgroup: SubgroupIndex) -> IdleResult<UpgradeDef> {
    let id = u.upgrade_id;
    let name = &u.upgrade_name;

    if !u.cost_increase_exponent.is_finite() || u.cost_increase_exponent <= 1.0 {
        return Err(IdleError::invalid_catalog(format!(
            "upgrade {id} '{name}': cost exponent must be > 1, got {}",
            u.cost_increase_exponent
        )));
    }
    if !u.base_cost.is_finite() || u.base_cost < 0.0 {
        return Err(IdleError::invalid_catalog(format!(
            "upgrade {id} '{name}': invalid base cost {}",
            u.base_cost
        )));
    }
    if !u.atom_production.is_finite() || u.atom_production < 0.0 {
        return Err(IdleError::invalid_catalog(format!(
            "upgrade {id} '{name}': invalid atom production {}",
            u.atom_production
        )));
    }

    let mut requirements = Vec::with_capacity(u.requires.len());
    for (req_id, amount) in u.requires {
        if req_id >= id {
            return Err(IdleError::invalid_catalog(format!(
                "upgrade {id} '{name}': requirement on {req_id} is a self or forward reference"
            )));
        }
        if amount == 0 {
            return Err(IdleError::invalid_catalog(format!(
                "upgrade {id} '{name}': requirement on {req_id} has amount 0"
            )));
        }
        requirements.push(Requirement { upgrade_id: req_id, minimum_purchased: amount });
    }

    Ok(UpgradeDef {
        upgrade_id: id,
        name: u.upgrade_name,
        base_cost: u.base_cost,
        cost_exponent: u.cost_increase_exponent,
        purchase_cap: u.upgrade_cap,
        atom_production: u.atom_production,
        requirements,
        group,
        subgroup,
    })
}

const TEST_CATALOG_JSON: &str = r#"{
  "groups": [
    {
      "group_name": "Matter",
      "unlock_cost": 0,
      "upgrade_subgroups": [
        {
          "subgroup_name": "Particles",
          "upgrades": [
            { "upgrade_id": 0, "upgrade_name": "Proton", "base_cost": 10,
              "cost_increase_exponent": 1.07, "upgrade_cap": 100,
              "atom_production": 1, "requires": [] },
            { "upgrade_id": 1, "upgrade_name": "Neutron", "base_cost": 50,
              "cost_increase_exponent": 1.1, "upgrade_cap": 50,
              "atom_production": 5, "requires": [[0, 5]] }
          ]
        },
        {
          "subgroup_name": "Elements",
          "upgrades": [
            { "upgrade_id": 2, "upgrade_name": "Hydrogen", "base_cost": 500,
              "cost_increase_exponent": 1.15, "upgrade_cap": 25,
              "atom_production": 40, "requires": [[0, 10], [1, 2]] }
          ]
        }
      ]
    },
    {
      "group_name": "Cosmos",
      "unlock_cost": 10000,
      "upgrade_subgroups": [
        {
          "subgroup_name": "Stars",
          "upgrades": [
            { "upgrade_id": 3, "upgrade_name": "Red Dwarf", "base_cost": 20000,
              "cost_increase_exponent": 1.2, "upgrade_cap": 10,
              "atom_production": 500, "requires": [[2, 1]] },
            { "upgrade_id": 4, "upgrade_name": "Singularity", "base_cost": 1000000,
              "cost_increase_exponent": 2.0, "upgrade_cap": 0,
              "atom_production": 0, "requires": [] }
          ]
        }
      ]
    }
  ],
  "bulk_buy_options": [1, 10, 25, 100]
}"#;
