//! Parametros de configuracion de la cafetera

/// Tiempo que tarda la maquina en preparar cualquier bebida
pub const PREPARATION_TIME_IN_SECONDS: u64 = 5;

/// Duracion de la ventana de reposicion. Mientras dure no se aceptan pedidos nuevos
pub const STOCKING_TIME_IN_SECONDS: u64 = 2;

/// Porcentaje a partir del cual se va a alertar de que se acaba un ingrediente
pub const X_PERCENTAGE_OF_CAPACITY: u64 = 20;

/// Indica cuanto tiempo se debe de esperar (por lo menos) para imprimir por pantalla las estadisticas de la cafetera
pub const STATISTICS_WAIT_IN_MS: u64 = 50;

/// Cantidad de pedidos que genera la simulacion
pub const TOTAL_ORDERS_IN_SIMULATION: usize = 30;

/// Espera entre llegadas de pedidos en la simulacion
pub const ORDER_ARRIVAL_WAIT_IN_MS: u64 = 100;
