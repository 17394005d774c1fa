//! Dispenser de la cafetera. Procesa los pedidos admitidos.
use std::{
    sync::{Arc, Condvar, Mutex, RwLock},
    thread,
    time::Duration,
};

use log::{debug, info};

use crate::{
    errors::CoffeeMachineError,
    inventory::Inventory,
    machine::MachineState,
    order::Order,
    orders_queue::OrdersQueue,
    recipe::RecipeBook,
};

/// Representa a un dispenser de la cafetera.
/// Tiene referencias a la cola de pedidos admitidos (junto con su variable
/// condicional), al recetario, al almacen de ingredientes, al estado de la
/// maquina y al contador de ordenes procesadas.
pub struct Dispenser {
    id: usize,
    orders_queue: Arc<Mutex<OrdersQueue>>,
    orders_cond: Arc<Condvar>,
    recipes: Arc<RecipeBook>,
    inventory: Arc<Mutex<Inventory>>,
    state: Arc<Mutex<MachineState>>,
    orders_processed: Arc<RwLock<u64>>,
    preparation_time: Duration,
}

impl Dispenser {
    pub fn new(
        id: usize,
        orders_queue: Arc<Mutex<OrdersQueue>>,
        orders_cond: Arc<Condvar>,
        recipes: Arc<RecipeBook>,
        inventory: Arc<Mutex<Inventory>>,
        state: Arc<Mutex<MachineState>>,
        orders_processed: Arc<RwLock<u64>>,
        preparation_time: Duration,
    ) -> Dispenser {
        Dispenser {
            id,
            orders_queue,
            orders_cond,
            recipes,
            inventory,
            state,
            orders_processed,
            preparation_time,
        }
    }

    pub fn handle_orders(&self) -> Result<(), CoffeeMachineError> {
        loop {
            let order = {
                let mut orders = self
                    .orders_cond
                    .wait_while(self.orders_queue.lock()?, |queue| {
                        queue.is_empty() && !queue.finished
                    })?;

                if orders.is_empty() && orders.finished {
                    return Ok(());
                }

                orders
                    .pop()
                    .ok_or(CoffeeMachineError::EmptyQueueWhenNotExpected)?
            };

            debug!("[DISPENSER {}] Takes order {}", self.id, order.id);
            self.process_order(order)?;
        }
    }

    /// Verifica y descuenta los ingredientes en una unica seccion critica,
    /// prepara la bebida sin retener ningun lock y libera el outlet al final,
    /// sin importar el resultado.
    fn process_order(&self, order: Order) -> Result<(), CoffeeMachineError> {
        let verdict = {
            let mut inventory = self.inventory.lock()?;
            match self.recipes.verify(&order.beverage, &inventory) {
                Ok(()) => self.recipes.commit(&order.beverage, &mut inventory),
                Err(rejection) => Err(rejection),
            }
        };

        let message = match verdict {
            Ok(()) => {
                debug!(
                    "[DISPENSER {}] Preparing {} for order {}",
                    self.id, order.beverage, order.id
                );
                thread::sleep(self.preparation_time);
                self.increase_processed_orders()?;
                format!("{} is prepared.", order.beverage)
            }
            Err(rejection) => {
                info!(
                    "[DISPENSER {}] Skipped order {}, {}",
                    self.id, order.id, rejection
                );
                rejection.to_string()
            }
        };

        self.release_outlet()?;
        order.deliver(message);
        Ok(())
    }

    fn release_outlet(&self) -> Result<(), CoffeeMachineError> {
        let mut state = self.state.lock()?;
        state.outlets_in_use -= 1;
        Ok(())
    }

    fn increase_processed_orders(&self) -> Result<(), CoffeeMachineError> {
        let mut processed = self
            .orders_processed
            .write()
            .map_err(|_| CoffeeMachineError::LockError)?;
        *processed += 1;
        Ok(())
    }
}
