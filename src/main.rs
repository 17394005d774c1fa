pub mod constants;
pub mod dispenser;
pub mod errors;
pub mod ingredient;
pub mod inventory;
pub mod machine;
pub mod order;
pub mod orders_queue;
pub mod recipe;
pub mod settings;
pub mod statistics;

use std::{env, sync::Arc, thread, time::Duration};

use log::{error, info, LevelFilter};
use rand::seq::SliceRandom;
use rand::thread_rng;
use simple_logger::SimpleLogger;

use crate::{
    constants::{ORDER_ARRIVAL_WAIT_IN_MS, TOTAL_ORDERS_IN_SIMULATION},
    errors::CoffeeMachineError,
    machine::CoffeeMachine,
    settings::load_settings,
    statistics::StatisticsPrinter,
};

fn main() {
    if SimpleLogger::new()
        .with_level(LevelFilter::Info)
        .init()
        .is_err()
    {
        println!("Could not initialize the logger");
    }
    if let Err(err) = run_simulation() {
        error!("[MACHINE] The simulation stopped with an error, {}", err);
    }
}

/// Simula la operacion de la maquina: pedidos aleatorios concurrentes,
/// control de ingredientes bajos y reposicion cuando hace falta.
fn run_simulation() -> Result<(), CoffeeMachineError> {
    let path = env::args()
        .nth(1)
        .unwrap_or_else(|| String::from("settings.json"));
    let settings = load_settings(path)?;
    let machine = Arc::new(CoffeeMachine::new(settings)?);
    info!(
        "[MACHINE] Serving {:?} on {} outlets",
        machine.beverage_options(),
        machine.outlet_count()
    );

    let statistics_printer = Arc::new(StatisticsPrinter::new(machine.clone()));
    let printer = statistics_printer.clone();
    let statistics_thread = thread::spawn(move || printer.process_statistics());

    let beverages = machine.beverage_options();
    let mut tickets = Vec::new();
    for _ in 0..TOTAL_ORDERS_IN_SIMULATION {
        if let Some(beverage) = beverages.choose(&mut thread_rng()) {
            match machine.submit_order(beverage) {
                Ok(ticket) => tickets.push(ticket),
                Err(rejection) => info!("[MACHINE] {}", rejection),
            }
        }

        let running_low = machine.ingredients_running_low()?;
        if !running_low.is_empty() {
            info!("[MACHINE] Ingredients running low: {:?}", running_low);
            machine.restock_to_full(&[])?;
        }

        thread::sleep(Duration::from_millis(ORDER_ARRIVAL_WAIT_IN_MS));
    }

    for ticket in tickets {
        info!("[OUTLET] {}", ticket.wait()?);
    }

    statistics_printer.finish();
    match statistics_thread.join() {
        Ok(result) => result?,
        Err(_) => error!("[MACHINE] Error joining the statistics thread"),
    }
    machine.shutdown()?;
    Ok(())
}
