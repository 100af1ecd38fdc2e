use sysinfo::Components;
use tracing::debug;

use crate::config::monitor_config::{CpuTemperature, Evaluate, Predicate};
use crate::config::PLACEHOLDER_CPU_TEMP;

/// Something that reports a temperature in Celsius. Never fails; falls back to a placeholder.
pub trait TemperatureSensor {
    fn read_celsius(&mut self) -> f32;
}

#[derive(Debug, Clone, Copy)]
pub struct ConstantTemperature(pub f32);

impl TemperatureSensor for ConstantTemperature {
    fn read_celsius(&mut self) -> f32 {
        self.0
    }
}

/// Averages the hardware sensors whose label matches one of the predicates.
#[derive(Debug)]
pub struct ComponentTemperature {
    components: Components,
    labels: Vec<Predicate>,
}

impl ComponentTemperature {
    pub fn new(labels: Vec<Predicate>) -> Self {
        ComponentTemperature {
            components: Components::new_with_refreshed_list(),
            labels,
        }
    }
}

impl TemperatureSensor for ComponentTemperature {
    fn read_celsius(&mut self) -> f32 {
        self.components.refresh();

        let mut temp_total = 0f32;
        let mut count = 0;

        self.components
            .iter()
            .filter(|component| {
                self.labels
                    .iter()
                    .any(|predicate| predicate.evaluate(component.label()))
            })
            .filter(|component| component.temperature().is_finite())
            .for_each(|component| {
                temp_total += component.temperature();
                count += 1;
            });

        if count == 0 {
            debug!("No matching temperature sensors, using placeholder");
            return PLACEHOLDER_CPU_TEMP;
        }

        temp_total / count as f32
    }
}

pub fn build_cpu_sensor(config: &CpuTemperature) -> Box<dyn TemperatureSensor> {
    match config {
        CpuTemperature::Constant(value) => Box::new(ConstantTemperature(*value)),
        CpuTemperature::Components(labels) => Box::new(ComponentTemperature::new(labels.clone())),
    }
}
