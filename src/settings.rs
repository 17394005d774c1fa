use log::info;
use std::collections::HashMap;
use std::error::Error;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::constants::{PREPARATION_TIME_IN_SECONDS, STOCKING_TIME_IN_SECONDS};
use crate::errors::CoffeeMachineError;

#[derive(Deserialize, Debug)]
struct JsonSettings {
    machine: JsonMachine,
}

#[derive(Deserialize, Debug)]
struct JsonMachine {
    outlets: JsonOutlets,
    total_items_quantity: HashMap<String, u64>,
    beverages: HashMap<String, HashMap<String, u64>>,
}

#[derive(Deserialize, Debug)]
struct JsonOutlets {
    count_n: usize,
}

/// Configuracion ya tipada de la maquina. Se valida una sola vez al arrancar,
/// el resto del programa no vuelve a tocar JSON.
pub struct MachineSettings {
    pub outlets: usize,
    pub ingredients: HashMap<String, u64>,
    pub beverages: HashMap<String, HashMap<String, u64>>,
    pub preparation_time: Duration,
    pub stocking_time: Duration,
}

impl MachineSettings {
    pub fn new(
        outlets: usize,
        ingredients: HashMap<String, u64>,
        beverages: HashMap<String, HashMap<String, u64>>,
    ) -> MachineSettings {
        MachineSettings {
            outlets,
            ingredients,
            beverages,
            preparation_time: Duration::from_secs(PREPARATION_TIME_IN_SECONDS),
            stocking_time: Duration::from_secs(STOCKING_TIME_IN_SECONDS),
        }
    }
}

fn read_settings_from_file<P: AsRef<Path>>(path: P) -> Result<JsonSettings, Box<dyn Error>> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let settings: JsonSettings = serde_json::from_reader(reader)?;
    Ok(settings)
}

pub fn load_settings<P: AsRef<Path>>(path: P) -> Result<MachineSettings, CoffeeMachineError> {
    match read_settings_from_file(path) {
        Ok(json_settings) => {
            info!(
                "[SETTINGS] Loaded {} ingredients and {} beverages",
                json_settings.machine.total_items_quantity.len(),
                json_settings.machine.beverages.len()
            );
            Ok(MachineSettings::new(
                json_settings.machine.outlets.count_n,
                json_settings.machine.total_items_quantity,
                json_settings.machine.beverages,
            ))
        }
        Err(_) => Err(CoffeeMachineError::FileReaderError),
    }
}
