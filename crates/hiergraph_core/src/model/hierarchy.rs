//! Hierarchy fields and the flat field table.
//!
//! # Responsibility
//! - Resolve configured hierarchies into named directional fields.
//! - Answer "which hierarchy/direction owns this field" and reciprocal lookups.
//!
//! # Invariants
//! - Field names are unique across the whole table; the first hierarchy that
//!   declares a name owns it.
//! - A hierarchy owns at most one field per direction.

use crate::config::HierarchyConfig;
use crate::error::{BuildError, BuildErrors};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

/// Relation direction of a field inside its hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Same,
    Down,
    Next,
    Prev,
}

impl Direction {
    pub const ALL: [Direction; 5] = [
        Direction::Up,
        Direction::Same,
        Direction::Down,
        Direction::Next,
        Direction::Prev,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Same => "same",
            Self::Down => "down",
            Self::Next => "next",
            Self::Prev => "prev",
        }
    }

    /// Direction of the reverse relation. `Same` is its own reciprocal.
    pub fn reciprocal(self) -> Direction {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
            Self::Same => Self::Same,
            Self::Next => Self::Prev,
            Self::Prev => Self::Next,
        }
    }
}

impl Display for Direction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One named field resolved from a hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HierarchyField {
    pub name: String,
    pub hierarchy_index: usize,
    pub direction: Direction,
}

/// Flat lookup table over all configured hierarchy fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldTable {
    fields: Vec<HierarchyField>,
    by_name: BTreeMap<String, usize>,
    implied: Vec<bool>,
}

impl FieldTable {
    /// Builds the table, reporting duplicate names as `invalid_setting_value`.
    pub fn from_hierarchies(hierarchies: &[HierarchyConfig], errors: &mut BuildErrors) -> Self {
        let mut table = Self::default();
        for (hierarchy_index, hierarchy) in hierarchies.iter().enumerate() {
            table.implied.push(hierarchy.implied);
            for direction in Direction::ALL {
                let Some(name) = hierarchy.field_for(direction) else {
                    continue;
                };
                if let Some(existing) = table.get(name) {
                    errors.push(BuildError::invalid_setting(
                        format!(
                            "field `{name}` is already defined as `{}` in hierarchy {}",
                            existing.direction, existing.hierarchy_index
                        ),
                        format!("settings.hierarchies[{hierarchy_index}].{direction}"),
                    ));
                    continue;
                }
                table.by_name.insert(name.to_string(), table.fields.len());
                table.fields.push(HierarchyField {
                    name: name.to_string(),
                    hierarchy_index,
                    direction,
                });
            }
        }
        table
    }

    /// Looks up one field by name.
    pub fn get(&self, name: &str) -> Option<&HierarchyField> {
        self.by_name.get(name).map(|idx| &self.fields[*idx])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// All fields in hierarchy order, then direction order.
    pub fn fields(&self) -> &[HierarchyField] {
        &self.fields
    }

    pub fn hierarchy_count(&self) -> usize {
        self.implied.len()
    }

    /// Returns the field owning `direction` in one hierarchy.
    pub fn field_in(
        &self,
        hierarchy_index: usize,
        direction: Direction,
    ) -> Option<&HierarchyField> {
        self.fields
            .iter()
            .find(|field| field.hierarchy_index == hierarchy_index && field.direction == direction)
    }

    /// Returns the reciprocal field of `name`, if its hierarchy implies one.
    pub fn reciprocal_of(&self, name: &str) -> Option<&HierarchyField> {
        let field = self.get(name)?;
        if !self.implies(field.hierarchy_index) {
            return None;
        }
        self.field_in(field.hierarchy_index, field.direction.reciprocal())
    }

    /// Whether reciprocal closure is enabled for a hierarchy.
    pub fn implies(&self, hierarchy_index: usize) -> bool {
        self.implied.get(hierarchy_index).copied().unwrap_or(false)
    }
}
