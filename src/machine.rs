//! Maquina de cafe. Admite pedidos, coordina la reposicion y arma el pool de dispensers.
use std::{
    collections::HashMap,
    sync::{mpsc, Arc, Condvar, Mutex, RwLock},
    thread::{self, JoinHandle},
    time::{Duration, Instant},
};

use log::{debug, error, info};

use crate::{
    dispenser::Dispenser,
    errors::CoffeeMachineError,
    inventory::Inventory,
    order::{Order, OrderTicket},
    orders_queue::OrdersQueue,
    recipe::RecipeBook,
    settings::MachineSettings,
};

/// Estado compartido de la maquina: outlets ocupados, ventana de reposicion
/// y el proximo id de pedido. Protegido por su propio lock, que nunca se
/// retiene durante la preparacion de una bebida.
pub struct MachineState {
    pub outlets_in_use: usize,
    pub restocking_started: Option<Instant>,
    pub next_order_id: usize,
}

impl MachineState {
    pub fn new() -> MachineState {
        MachineState {
            outlets_in_use: 0,
            restocking_started: None,
            next_order_id: 0,
        }
    }
}

/// La cafetera. Unica instancia construida por el punto de entrada y
/// compartida por referencia con todos los que piden bebidas.
pub struct CoffeeMachine {
    outlets: usize,
    stocking_time: Duration,
    recipes: Arc<RecipeBook>,
    inventory: Arc<Mutex<Inventory>>,
    state: Arc<Mutex<MachineState>>,
    orders_queue: Arc<Mutex<OrdersQueue>>,
    orders_cond: Arc<Condvar>,
    orders_processed: Arc<RwLock<u64>>,
    dispenser_handles: Mutex<Vec<JoinHandle<()>>>,
}

impl CoffeeMachine {
    /// Construye la maquina a partir de la configuracion ya validada y lanza
    /// un dispenser por outlet.
    pub fn new(settings: MachineSettings) -> Result<CoffeeMachine, CoffeeMachineError> {
        if settings.outlets == 0 {
            return Err(CoffeeMachineError::InvalidConfiguration(
                "the machine needs at least one outlet".to_string(),
            ));
        }

        let mut inventory = Inventory::new();
        for (name, max_quantity) in &settings.ingredients {
            inventory.register(name, *max_quantity)?;
        }

        let mut recipes = RecipeBook::new();
        for (beverage, required_ingredients) in settings.beverages {
            recipes.define(&beverage, required_ingredients);
        }

        for name in settings.ingredients.keys() {
            let minimum_requirement = recipes.largest_requirement_of(name);
            if minimum_requirement > 0 {
                inventory.raise_threshold(name, minimum_requirement);
            }
        }

        let machine = CoffeeMachine {
            outlets: settings.outlets,
            stocking_time: settings.stocking_time,
            recipes: Arc::new(recipes),
            inventory: Arc::new(Mutex::new(inventory)),
            state: Arc::new(Mutex::new(MachineState::new())),
            orders_queue: Arc::new(Mutex::new(OrdersQueue::new())),
            orders_cond: Arc::new(Condvar::new()),
            orders_processed: Arc::new(RwLock::new(0)),
            dispenser_handles: Mutex::new(Vec::new()),
        };
        machine.spawn_dispensers(settings.preparation_time)?;
        Ok(machine)
    }

    fn spawn_dispensers(&self, preparation_time: Duration) -> Result<(), CoffeeMachineError> {
        let mut handles = self.dispenser_handles.lock()?;
        for id in 0..self.outlets {
            let dispenser = Dispenser::new(
                id,
                self.orders_queue.clone(),
                self.orders_cond.clone(),
                self.recipes.clone(),
                self.inventory.clone(),
                self.state.clone(),
                self.orders_processed.clone(),
                preparation_time,
            );
            handles.push(thread::spawn(move || {
                if let Err(err) = dispenser.handle_orders() {
                    error!("[DISPENSER {}] Stopped with an error, {:?}", id, err);
                }
            }));
        }
        Ok(())
    }

    /// Admision de pedidos. Rechaza si la bebida no esta en el recetario, si
    /// la maquina esta reponiendo (la ventana expira de forma perezosa aca
    /// mismo) o si no quedan outlets libres. Si acepta, ocupa un outlet y
    /// encola el pedido para los dispensers.
    pub fn submit_order(&self, beverage: &str) -> Result<OrderTicket, CoffeeMachineError> {
        if !self.recipes.contains(beverage) {
            return Err(CoffeeMachineError::BeverageNotSupported(
                beverage.to_string(),
            ));
        }

        let order_id = {
            let mut state = self.state.lock()?;
            if let Some(started) = state.restocking_started {
                let elapsed = started.elapsed();
                if elapsed >= self.stocking_time {
                    state.restocking_started = None;
                } else {
                    return Err(CoffeeMachineError::RestockingInProgress {
                        seconds_left: self.stocking_time.as_secs() - elapsed.as_secs(),
                    });
                }
            }
            if state.outlets_in_use >= self.outlets {
                return Err(CoffeeMachineError::NoOutletAvailable);
            }
            state.outlets_in_use += 1;
            let id = state.next_order_id;
            state.next_order_id += 1;
            id
        };

        let (result_sender, result_receiver) = mpsc::channel();
        {
            let mut queue = self.orders_queue.lock()?;
            queue.push(Order::new(order_id, beverage.to_string(), result_sender));
        }
        self.orders_cond.notify_one();
        debug!("[MACHINE] Accepted order {} for {}", order_id, beverage);
        Ok(OrderTicket::new(order_id, result_receiver))
    }

    /// Suma las cantidades pedidas a los ingredientes dados y abre la ventana
    /// de reposicion. Si la maquina ya estaba reponiendo no hace nada. Los
    /// nombres desconocidos se ignoran.
    pub fn restock_by_amount(
        &self,
        amounts: &HashMap<String, u64>,
    ) -> Result<(), CoffeeMachineError> {
        let mut state = self.state.lock()?;
        if state.restocking_started.is_some() {
            return Err(CoffeeMachineError::AlreadyRestocking);
        }
        state.restocking_started = Some(Instant::now());
        let mut inventory = self.inventory.lock()?;
        for (name, amount) in amounts {
            inventory.restock_by(name, *amount);
        }
        info!("[MACHINE] Restocking ingredients by the requested amounts");
        Ok(())
    }

    /// Repone los ingredientes dados a su capacidad maxima, o todos si no se
    /// nombra ninguno, y abre la ventana de reposicion. Los nombres
    /// desconocidos se ignoran.
    pub fn restock_to_full(&self, names: &[String]) -> Result<(), CoffeeMachineError> {
        let mut state = self.state.lock()?;
        state.restocking_started = Some(Instant::now());
        let mut inventory = self.inventory.lock()?;
        if names.is_empty() {
            inventory.restock_all_to_full();
            info!("[MACHINE] Restocking every ingredient to its max capacity");
        } else {
            for name in names {
                inventory.restock_to_full(name);
            }
            info!("[MACHINE] Restocking {:?} to their max capacity", names);
        }
        Ok(())
    }

    /// Da de alta un ingrediente que no estaba en la maquina, con el umbral
    /// de alerta que le corresponda segun las recetas ya definidas.
    pub fn add_ingredient(&self, name: &str, max_quantity: u64) -> Result<(), CoffeeMachineError> {
        let mut inventory = self.inventory.lock()?;
        inventory.register(name, max_quantity)?;
        let minimum_requirement = self.recipes.largest_requirement_of(name);
        if minimum_requirement > 0 {
            inventory.raise_threshold(name, minimum_requirement);
        }
        info!("[MACHINE] Added ingredient {} with capacity {}", name, max_quantity);
        Ok(())
    }

    /// Ingredientes por debajo de su umbral de alerta, con (stock actual, capacidad maxima).
    pub fn ingredients_running_low(
        &self,
    ) -> Result<HashMap<String, (u64, u64)>, CoffeeMachineError> {
        let inventory = self.inventory.lock()?;
        Ok(inventory.running_low())
    }

    /// Foto del stock actual de cada ingrediente.
    pub fn ingredient_levels(&self) -> Result<HashMap<String, u64>, CoffeeMachineError> {
        let inventory = self.inventory.lock()?;
        Ok(inventory.snapshot())
    }

    /// Bebidas que sirve la maquina, ordenadas alfabeticamente.
    pub fn beverage_options(&self) -> Vec<String> {
        self.recipes.options()
    }

    pub fn outlet_count(&self) -> usize {
        self.outlets
    }

    pub fn orders_processed(&self) -> Result<u64, CoffeeMachineError> {
        let processed = self.orders_processed.read()?;
        Ok(*processed)
    }

    /// Apaga la maquina: marca la cola como terminada, despierta a todos los
    /// dispensers y espera a que terminen los pedidos en curso.
    pub fn shutdown(&self) -> Result<(), CoffeeMachineError> {
        {
            let mut queue = self.orders_queue.lock()?;
            queue.finished = true;
        }
        self.orders_cond.notify_all();
        let handles: Vec<JoinHandle<()>> = {
            let mut handles = self.dispenser_handles.lock()?;
            handles.drain(..).collect()
        };
        for handle in handles {
            if handle.join().is_err() {
                error!("[MACHINE] Error joining a dispenser thread");
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn test_settings(
        outlets: usize,
        ingredients: &[(&str, u64)],
        beverages: &[(&str, &[(&str, u64)])],
    ) -> MachineSettings {
        MachineSettings {
            outlets,
            ingredients: ingredients
                .iter()
                .map(|(name, quantity)| (name.to_string(), *quantity))
                .collect(),
            beverages: beverages
                .iter()
                .map(|(beverage, required)| {
                    (
                        beverage.to_string(),
                        required
                            .iter()
                            .map(|(name, quantity)| (name.to_string(), *quantity))
                            .collect(),
                    )
                })
                .collect(),
            preparation_time: Duration::from_millis(50),
            stocking_time: Duration::from_millis(300),
        }
    }

    #[test]
    fn should_reject_a_configuration_without_outlets() {
        let settings = test_settings(0, &[("hot_water", 500)], &[]);
        let result = CoffeeMachine::new(settings);
        assert_eq!(
            Some(CoffeeMachineError::InvalidConfiguration(
                "the machine needs at least one outlet".to_string()
            )),
            result.err()
        );
    }

    #[test]
    fn should_prepare_a_beverage_and_consume_its_ingredients() {
        let settings = test_settings(
            1,
            &[("hot_water", 500), ("tea_leaves_syrup", 100)],
            &[("hot_tea", &[("hot_water", 200), ("tea_leaves_syrup", 30)])],
        );
        let machine = CoffeeMachine::new(settings).unwrap();
        let ticket = machine.submit_order("hot_tea").unwrap();
        assert_eq!(Ok("hot_tea is prepared.".to_string()), ticket.wait());
        let levels = machine.ingredient_levels().unwrap();
        assert_eq!(Some(&300), levels.get("hot_water"));
        assert_eq!(Some(&70), levels.get("tea_leaves_syrup"));
        assert_eq!(Ok(1), machine.orders_processed());
        machine.shutdown().unwrap();
    }

    #[test]
    fn should_reject_an_unsupported_beverage_without_touching_state() {
        let settings = test_settings(
            1,
            &[("hot_water", 500)],
            &[("hot_tea", &[("hot_water", 200)])],
        );
        let machine = CoffeeMachine::new(settings).unwrap();
        let result = machine.submit_order("masala_tea");
        assert_eq!(
            Some(CoffeeMachineError::BeverageNotSupported(
                "masala_tea".to_string()
            )),
            result.err()
        );
        assert_eq!(
            Some(&500),
            machine.ingredient_levels().unwrap().get("hot_water")
        );
        let ticket = machine.submit_order("hot_tea").unwrap();
        assert_eq!(Ok("hot_tea is prepared.".to_string()), ticket.wait());
        machine.shutdown().unwrap();
    }

    #[test]
    fn should_report_an_insufficient_ingredient_in_the_result() {
        let settings = test_settings(
            1,
            &[("hot_water", 100)],
            &[("hot_tea", &[("hot_water", 200)])],
        );
        let machine = CoffeeMachine::new(settings).unwrap();
        let ticket = machine.submit_order("hot_tea").unwrap();
        assert_eq!(
            Ok("hot_tea can not be prepared because hot_water is not sufficient.".to_string()),
            ticket.wait()
        );
        assert_eq!(
            Some(&100),
            machine.ingredient_levels().unwrap().get("hot_water")
        );
        machine.shutdown().unwrap();
    }

    #[test]
    fn should_release_the_outlet_after_a_failed_order() {
        let settings = test_settings(
            1,
            &[("hot_water", 100)],
            &[("hot_tea", &[("hot_water", 200)])],
        );
        let machine = CoffeeMachine::new(settings).unwrap();
        let first = machine.submit_order("hot_tea").unwrap();
        first.wait().unwrap();
        let second = machine.submit_order("hot_tea");
        assert_eq!(true, second.is_ok());
        second.unwrap().wait().unwrap();
        machine.shutdown().unwrap();
    }

    #[test]
    fn should_reject_orders_beyond_the_outlet_capacity() {
        let settings = test_settings(
            1,
            &[("hot_water", 500)],
            &[("hot_tea", &[("hot_water", 100)])],
        );
        let machine = CoffeeMachine::new(settings).unwrap();
        let first = machine.submit_order("hot_tea").unwrap();
        let second = machine.submit_order("hot_tea");
        assert_eq!(
            Some(CoffeeMachineError::NoOutletAvailable),
            second.err()
        );
        first.wait().unwrap();
        let third = machine.submit_order("hot_tea");
        assert_eq!(true, third.is_ok());
        third.unwrap().wait().unwrap();
        machine.shutdown().unwrap();
    }

    #[test]
    fn should_serve_exactly_what_the_stock_allows_under_concurrency() {
        let settings = test_settings(
            2,
            &[("hot_water", 10)],
            &[("strong_tea", &[("hot_water", 6)])],
        );
        let machine = CoffeeMachine::new(settings).unwrap();
        let first = machine.submit_order("strong_tea").unwrap();
        let second = machine.submit_order("strong_tea").unwrap();
        let results = vec![first.wait().unwrap(), second.wait().unwrap()];
        let prepared = results
            .iter()
            .filter(|result| result.ends_with("is prepared."))
            .count();
        assert_eq!(1, prepared);
        assert_eq!(
            1,
            results
                .iter()
                .filter(|result| {
                    result.as_str()
                        == "strong_tea can not be prepared because hot_water is not sufficient."
                })
                .count()
        );
        assert_eq!(
            Some(&4),
            machine.ingredient_levels().unwrap().get("hot_water")
        );
        machine.shutdown().unwrap();
    }

    #[test]
    fn should_never_overdraw_an_ingredient_with_many_concurrent_orders() {
        let settings = test_settings(
            6,
            &[("hot_water", 10)],
            &[("hot_tea", &[("hot_water", 3)])],
        );
        let machine = Arc::new(CoffeeMachine::new(settings).unwrap());
        let submitters: Vec<_> = (0..6)
            .map(|_| {
                let machine = machine.clone();
                thread::spawn(move || {
                    machine
                        .submit_order("hot_tea")
                        .and_then(|ticket| ticket.wait())
                })
            })
            .collect();
        let results: Vec<String> = submitters
            .into_iter()
            .map(|handle| handle.join().unwrap().unwrap())
            .collect();
        let prepared = results
            .iter()
            .filter(|result| result.ends_with("is prepared."))
            .count();
        assert_eq!(3, prepared);
        assert_eq!(
            Some(&1),
            machine.ingredient_levels().unwrap().get("hot_water")
        );
        assert_eq!(Ok(3), machine.orders_processed());
        machine.shutdown().unwrap();
    }

    #[test]
    fn should_reject_orders_while_restocking_with_the_seconds_left() {
        let mut settings = test_settings(
            1,
            &[("hot_water", 500)],
            &[("hot_tea", &[("hot_water", 100)])],
        );
        settings.stocking_time = Duration::from_secs(2);
        let machine = CoffeeMachine::new(settings).unwrap();
        let mut amounts = HashMap::new();
        amounts.insert("hot_water".to_string(), 50);
        machine.restock_by_amount(&amounts).unwrap();
        let result = machine.submit_order("hot_tea");
        assert_eq!(
            Some(CoffeeMachineError::RestockingInProgress { seconds_left: 2 }),
            result.err()
        );
        machine.shutdown().unwrap();
    }

    #[test]
    fn should_accept_orders_again_after_the_restocking_window_elapses() {
        let mut settings = test_settings(
            1,
            &[("hot_water", 500)],
            &[("hot_tea", &[("hot_water", 100)])],
        );
        settings.stocking_time = Duration::from_millis(500);
        let machine = CoffeeMachine::new(settings).unwrap();
        machine.restock_to_full(&[]).unwrap();
        let rejected = machine.submit_order("hot_tea");
        assert_eq!(true, rejected.is_err());
        thread::sleep(Duration::from_millis(700));
        let accepted = machine.submit_order("hot_tea");
        assert_eq!(true, accepted.is_ok());
        assert_eq!(
            Ok("hot_tea is prepared.".to_string()),
            accepted.unwrap().wait()
        );
        machine.shutdown().unwrap();
    }

    #[test]
    fn should_report_already_restocking_and_keep_the_first_restock() {
        let settings = test_settings(
            1,
            &[("hot_water", 500)],
            &[("hot_tea", &[("hot_water", 100)])],
        );
        let machine = CoffeeMachine::new(settings).unwrap();
        let mut first_amounts = HashMap::new();
        first_amounts.insert("hot_water".to_string(), 50);
        machine.restock_by_amount(&first_amounts).unwrap();
        let mut second_amounts = HashMap::new();
        second_amounts.insert("hot_water".to_string(), 70);
        let second = machine.restock_by_amount(&second_amounts);
        assert_eq!(Some(CoffeeMachineError::AlreadyRestocking), second.err());
        assert_eq!(
            Some(&550),
            machine.ingredient_levels().unwrap().get("hot_water")
        );
        machine.shutdown().unwrap();
    }

    #[test]
    fn should_skip_unknown_ingredients_when_restocking_by_amount() {
        let settings = test_settings(
            1,
            &[("hot_water", 500)],
            &[("hot_tea", &[("hot_water", 100)])],
        );
        let machine = CoffeeMachine::new(settings).unwrap();
        let mut amounts = HashMap::new();
        amounts.insert("hot_water".to_string(), 100);
        amounts.insert("sugar_syrup".to_string(), 50);
        machine.restock_by_amount(&amounts).unwrap();
        let levels = machine.ingredient_levels().unwrap();
        assert_eq!(Some(&600), levels.get("hot_water"));
        assert_eq!(None, levels.get("sugar_syrup"));
        machine.shutdown().unwrap();
    }

    #[test]
    fn should_restock_every_ingredient_to_its_max_capacity() {
        let settings = test_settings(
            1,
            &[("hot_water", 500), ("hot_milk", 300)],
            &[("milk_tea", &[("hot_water", 200), ("hot_milk", 150)])],
        );
        let machine = CoffeeMachine::new(settings).unwrap();
        let ticket = machine.submit_order("milk_tea").unwrap();
        ticket.wait().unwrap();
        machine.restock_to_full(&[]).unwrap();
        let levels = machine.ingredient_levels().unwrap();
        assert_eq!(Some(&500), levels.get("hot_water"));
        assert_eq!(Some(&300), levels.get("hot_milk"));
        machine.shutdown().unwrap();
    }

    #[test]
    fn should_restock_only_the_named_ingredients() {
        let settings = test_settings(
            1,
            &[("hot_water", 500), ("hot_milk", 300)],
            &[("milk_tea", &[("hot_water", 200), ("hot_milk", 150)])],
        );
        let machine = CoffeeMachine::new(settings).unwrap();
        let ticket = machine.submit_order("milk_tea").unwrap();
        ticket.wait().unwrap();
        let names = vec!["hot_water".to_string(), "sugar_syrup".to_string()];
        machine.restock_to_full(&names).unwrap();
        let levels = machine.ingredient_levels().unwrap();
        assert_eq!(Some(&500), levels.get("hot_water"));
        assert_eq!(Some(&150), levels.get("hot_milk"));
        machine.shutdown().unwrap();
    }

    #[test]
    fn should_add_a_missing_ingredient_and_then_serve_the_beverage() {
        let settings = test_settings(
            1,
            &[("hot_water", 500)],
            &[("sweet_tea", &[("hot_water", 100), ("sugar_syrup", 30)])],
        );
        let machine = CoffeeMachine::new(settings).unwrap();
        let rejected = machine.submit_order("sweet_tea").unwrap();
        assert_eq!(
            Ok("sweet_tea can not be prepared because sugar_syrup is not available.".to_string()),
            rejected.wait()
        );
        machine.add_ingredient("sugar_syrup", 40).unwrap();
        let accepted = machine.submit_order("sweet_tea").unwrap();
        assert_eq!(
            Ok("sweet_tea is prepared.".to_string()),
            accepted.wait()
        );
        let running_low = machine.ingredients_running_low().unwrap();
        assert_eq!(Some(&(10, 40)), running_low.get("sugar_syrup"));
        machine.shutdown().unwrap();
    }

    #[test]
    fn should_reject_adding_an_ingredient_twice() {
        let settings = test_settings(
            1,
            &[("hot_water", 500)],
            &[("hot_tea", &[("hot_water", 100)])],
        );
        let machine = CoffeeMachine::new(settings).unwrap();
        let result = machine.add_ingredient("hot_water", 900);
        assert_eq!(
            Some(CoffeeMachineError::IngredientAlreadyPresent(
                "hot_water".to_string()
            )),
            result.err()
        );
        assert_eq!(
            Some(&500),
            machine.ingredient_levels().unwrap().get("hot_water")
        );
        machine.shutdown().unwrap();
    }

    #[test]
    fn should_not_report_low_ingredients_on_a_freshly_stocked_machine() {
        let settings = test_settings(
            2,
            &[("hot_water", 500), ("hot_milk", 300)],
            &[("milk_tea", &[("hot_water", 200), ("hot_milk", 150)])],
        );
        let machine = CoffeeMachine::new(settings).unwrap();
        assert_eq!(0, machine.ingredients_running_low().unwrap().len());
        assert_eq!(2, machine.outlet_count());
        machine.shutdown().unwrap();
    }
}
