//! # Routine registry
//!
//! Holds the named routines which can be selected before the autonomous period. The registry is
//! built once at start-up and passed to whatever does the selection, there is no global list.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::{info, warn};

use super::{Auton, AutonError};

// ------------------------------------------------------------------------------------------------
// TYPES
// ------------------------------------------------------------------------------------------------

/// Signature of a routine.
pub type Entrypoint = fn(&Auton<'_>) -> Result<(), AutonError>;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A named routine.
#[derive(Clone)]
pub struct RoutineEntry {
    name: String,
    entrypoint: Entrypoint,
}

/// Ordered list of routines and the current selection.
#[derive(Default)]
pub struct RoutineRegistry {
    entries: Vec<RoutineEntry>,

    /// Index of the selected routine. The first registered routine is selected by default.
    selected: Option<usize>,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("No routine is selected, the registry is empty")]
    NoRoutineSelected,

    #[error("Routine index {0} is out of range, {1} routines are registered")]
    IndexOutOfRange(usize, usize),

    #[error("No routine named \"{0}\" is registered")]
    UnknownRoutine(String),

    #[error("Routine \"{0}\" failed: {1}")]
    RoutineFailed(String, #[source] AutonError),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl RoutineEntry {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn entrypoint(&self) -> Entrypoint {
        self.entrypoint
    }
}

impl std::fmt::Debug for RoutineEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoutineEntry")
            .field("name", &self.name)
            .finish()
    }
}

impl RoutineRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a routine. Names need not be unique.
    pub fn register(&mut self, name: &str, entrypoint: Entrypoint) {
        self.entries.push(RoutineEntry {
            name: name.into(),
            entrypoint,
        });

        if self.selected.is_none() {
            self.selected = Some(0);
        }
    }

    /// Names of the routines in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The currently selected routine.
    pub fn selected(&self) -> Option<&RoutineEntry> {
        self.selected.and_then(|i| self.entries.get(i))
    }

    /// Select the routine at `index`.
    pub fn select(&mut self, index: usize) -> Result<&RoutineEntry, RegistryError> {
        if index >= self.entries.len() {
            return Err(RegistryError::IndexOutOfRange(index, self.entries.len()));
        }

        self.selected = Some(index);
        Ok(&self.entries[index])
    }

    /// Select the first routine named `name`.
    pub fn select_by_name(&mut self, name: &str) -> Result<&RoutineEntry, RegistryError> {
        let matches: Vec<usize> = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.name == name)
            .map(|(i, _)| i)
            .collect();

        match matches.first() {
            Some(&index) => {
                if matches.len() > 1 {
                    warn!(
                        "{} routines are named \"{}\", selecting the first (index {})",
                        matches.len(),
                        name,
                        index
                    );
                }
                self.select(index)
            }
            None => Err(RegistryError::UnknownRoutine(name.into())),
        }
    }

    /// Run the selected routine to completion on the calling thread.
    pub fn invoke_selected(&self, auton: &Auton) -> Result<(), RegistryError> {
        let entry = self.selected().ok_or(RegistryError::NoRoutineSelected)?;

        info!("Running routine \"{}\"", entry.name);

        (entry.entrypoint)(auton).map_err(|e| RegistryError::RoutineFailed(entry.name.clone(), e))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::auto::{mock::MockChassis, AutoParams};
    use chassis_if::{MotionController, PoseError, Speed};

    fn short_drive(auton: &Auton) -> Result<(), AutonError> {
        auton.drive(6.0, Speed(50), false);
        auton.settle();
        Ok(())
    }

    fn long_drive(auton: &Auton) -> Result<(), AutonError> {
        auton.drive(48.0, Speed(50), false);
        auton.settle();
        Ok(())
    }

    fn lost(auton: &Auton) -> Result<(), AutonError> {
        auton.chassis().pose()?;
        Ok(())
    }

    fn registry() -> RoutineRegistry {
        let mut reg = RoutineRegistry::new();
        reg.register("Short", short_drive);
        reg.register("Long", long_drive);
        reg.register("Short", long_drive);
        reg.register("Lost", lost);
        reg
    }

    #[test]
    fn test_selection() {
        let mut reg = registry();

        assert_eq!(reg.len(), 4);
        assert_eq!(reg.names(), vec!["Short", "Long", "Short", "Lost"]);
        assert_eq!(reg.selected().map(|e| e.name()), Some("Short"));

        assert_eq!(reg.select(1).unwrap().name(), "Long");

        match reg.select(4) {
            Err(RegistryError::IndexOutOfRange(4, 4)) => (),
            other => panic!("Unexpected result {:?}", other),
        }

        match reg.select_by_name("Sideways") {
            Err(RegistryError::UnknownRoutine(n)) => assert_eq!(n, "Sideways"),
            other => panic!("Unexpected result {:?}", other),
        }

        // Failed selections keep the previous one
        assert_eq!(reg.selected().map(|e| e.name()), Some("Long"));
    }

    #[test]
    fn test_duplicate_names_pick_first() {
        let mut reg = registry();
        reg.select(1).unwrap();
        reg.select_by_name("Short").unwrap();

        let chassis = MockChassis::new();
        let params = AutoParams::default();
        let auton = Auton::new(&chassis, &params);

        reg.invoke_selected(&auton).unwrap();

        match chassis.submitted()[0] {
            chassis_if::MotionTarget::Drive { dist_in, .. } => assert_eq!(dist_in, 6.0),
            other => panic!("Unexpected target {:?}", other),
        }
    }

    #[test]
    fn test_empty_registry() {
        let reg = RoutineRegistry::new();
        let chassis = MockChassis::new();
        let params = AutoParams::default();
        let auton = Auton::new(&chassis, &params);

        assert!(reg.is_empty());
        assert!(matches!(
            reg.invoke_selected(&auton),
            Err(RegistryError::NoRoutineSelected)
        ));
    }

    #[test]
    fn test_routine_failure_propagates() {
        let mut reg = registry();
        reg.select_by_name("Lost").unwrap();

        let chassis = MockChassis::new();
        chassis.set_pose(Err(PoseError::Unavailable));
        let params = AutoParams::default();
        let auton = Auton::new(&chassis, &params);

        match reg.invoke_selected(&auton) {
            Err(RegistryError::RoutineFailed(name, AutonError::PoseUnavailable(_))) => {
                assert_eq!(name, "Lost")
            }
            other => panic!("Unexpected result {:?}", other),
        }
    }
}
