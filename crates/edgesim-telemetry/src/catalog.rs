//! ---
//! sim_section: "02-telemetry-engine"
//! sim_subsection: "module"
//! sim_type: "source"
//! sim_scope: "code"
//! sim_description: "Machine catalog and per-machine baseline assignment."
//! sim_version: "v0.1.0"
//! sim_owner: "tbd"
//! ---
use edgesim_common::config::EngineConfig;
use indexmap::IndexMap;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Fixed nominal operating point of one machine, assigned once at engine
/// construction and never mutated afterwards.
///
/// Serialises with `baseline_`-prefixed metric names so the discovery record
/// is unambiguous next to reading records.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MachineBaseline {
    pub machine_id: String,
    #[serde(rename = "baseline_temperature")]
    pub temperature: f64,
    #[serde(rename = "baseline_vibration")]
    pub vibration: f64,
    #[serde(rename = "baseline_rpm")]
    pub rpm: f64,
}

/// Ordered catalog of simulated machines keyed by identifier.
#[derive(Debug, Clone)]
pub struct MachineCatalog {
    machines: IndexMap<String, MachineBaseline>,
}

impl MachineCatalog {
    /// Draw one baseline per machine from the configured ranges. Identifiers
    /// follow the `PREFIX_NNN` convention of the reference fleet.
    pub fn assign<R: Rng>(config: &EngineConfig, rng: &mut R) -> Self {
        let mut machines = IndexMap::with_capacity(config.num_machines);
        for index in 1..=config.num_machines {
            let machine_id = format!("{}_{:03}", config.machine_prefix, index);
            let baseline = MachineBaseline {
                machine_id: machine_id.clone(),
                temperature: rng
                    .gen_range(config.baselines.temperature.min..config.baselines.temperature.max),
                vibration: rng
                    .gen_range(config.baselines.vibration.min..config.baselines.vibration.max),
                rpm: rng.gen_range(config.baselines.rpm.min..config.baselines.rpm.max),
            };
            machines.insert(machine_id, baseline);
        }
        Self { machines }
    }

    pub fn get(&self, machine_id: &str) -> Option<&MachineBaseline> {
        self.machines.get(machine_id)
    }

    pub fn contains(&self, machine_id: &str) -> bool {
        self.machines.contains_key(machine_id)
    }

    /// Baseline at a stable insertion-order position, for round-robin and
    /// random selection.
    pub fn at(&self, index: usize) -> Option<&MachineBaseline> {
        self.machines.get_index(index).map(|(_, baseline)| baseline)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.machines.keys().map(String::as_str)
    }

    pub fn machines(&self) -> impl Iterator<Item = &MachineBaseline> {
        self.machines.values()
    }

    pub fn len(&self) -> usize {
        self.machines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.machines.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn catalog_for(seed: u64, machines: usize) -> MachineCatalog {
        let config = EngineConfig {
            num_machines: machines,
            ..EngineConfig::default()
        };
        let mut rng = StdRng::seed_from_u64(seed);
        MachineCatalog::assign(&config, &mut rng)
    }

    #[test]
    fn assigns_requested_number_of_machines() {
        let catalog = catalog_for(7, 5);
        assert_eq!(catalog.len(), 5);
        let ids: Vec<_> = catalog.ids().collect();
        assert_eq!(ids[0], "MACHINE_001");
        assert_eq!(ids[4], "MACHINE_005");
    }

    #[test]
    fn baselines_fall_within_configured_ranges() {
        let catalog = catalog_for(11, 20);
        for baseline in catalog.machines() {
            assert!((60.0..90.0).contains(&baseline.temperature));
            assert!((0.1..2.0).contains(&baseline.vibration));
            assert!((1000.0..3000.0).contains(&baseline.rpm));
        }
    }

    #[test]
    fn same_seed_assigns_identical_baselines() {
        let a = catalog_for(42, 5);
        let b = catalog_for(42, 5);
        for (left, right) in a.machines().zip(b.machines()) {
            assert_eq!(left, right);
        }
    }

    #[test]
    fn baseline_serialises_with_discovery_field_names() {
        let catalog = catalog_for(3, 1);
        let value = serde_json::to_value(catalog.at(0).unwrap()).unwrap();
        assert!(value.get("baseline_temperature").is_some());
        assert!(value.get("baseline_vibration").is_some());
        assert!(value.get("baseline_rpm").is_some());
        assert_eq!(value["machine_id"], "MACHINE_001");
    }
}
