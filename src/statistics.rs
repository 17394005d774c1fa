use std::{
    sync::{Arc, Mutex},
    thread,
    time::Duration,
};

use log::error;

use crate::{
    constants::STATISTICS_WAIT_IN_MS, errors::CoffeeMachineError, machine::CoffeeMachine,
};

pub struct StatisticsPrinter {
    machine: Arc<CoffeeMachine>,
    finish: Arc<Mutex<bool>>,
}

impl StatisticsPrinter {
    pub fn new(machine: Arc<CoffeeMachine>) -> StatisticsPrinter {
        StatisticsPrinter {
            machine,
            finish: Arc::new(Mutex::new(false)),
        }
    }

    pub fn finish(&self) {
        if let Ok(mut finish) = self.finish.lock() {
            *finish = true;
            return;
        }
        error!("Error setting statistics thread to finish");
    }

    pub fn process_statistics(&self) -> Result<(), CoffeeMachineError> {
        loop {
            if *self.finish.lock()? {
                self.print_statistics()?;
                return Ok(());
            }

            self.print_statistics()?;

            thread::sleep(Duration::from_millis(STATISTICS_WAIT_IN_MS));
        }
    }

    fn print_statistics(&self) -> Result<(), CoffeeMachineError> {
        let orders_processed = self.machine.orders_processed()?;
        let mut statistics = format!(
            "[STATISTICS] Orders processed={} | Ingredient=remaining |",
            orders_processed
        );
        for (ingredient, remaining) in self.machine.ingredient_levels()? {
            statistics.push_str(&format!(" {}={} ", ingredient, remaining));
        }
        println!("{}", statistics);
        Ok(())
    }
}
