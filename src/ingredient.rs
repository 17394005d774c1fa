//! Representacion de un ingrediente de la cafetera

use crate::constants::X_PERCENTAGE_OF_CAPACITY;

/// Registro de stock de un ingrediente. Arranca con el maximo de capacidad
/// y un umbral de alerta del porcentaje configurado.
pub struct Ingredient {
    max_quantity: u64,
    current_quantity: u64,
    low_threshold: u64,
}

impl Ingredient {
    pub fn new(max_quantity: u64) -> Ingredient {
        Ingredient {
            max_quantity,
            current_quantity: max_quantity,
            low_threshold: max_quantity * X_PERCENTAGE_OF_CAPACITY / 100,
        }
    }

    /// Sube el umbral de alerta si el minimo pedido es mayor al actual. Nunca lo baja.
    pub fn raise_threshold(&mut self, minimum_requirement: u64) {
        if minimum_requirement > self.low_threshold {
            self.low_threshold = minimum_requirement;
        }
    }

    pub fn is_sufficient(&self, quantity: u64) -> bool {
        self.current_quantity >= quantity
    }

    /// Descuenta del stock. El llamador tiene que haber verificado la
    /// suficiencia antes, dentro de la misma seccion critica.
    pub fn consume(&mut self, quantity: u64) {
        self.current_quantity -= quantity;
    }

    pub fn restock_to_full(&mut self) {
        self.current_quantity = self.max_quantity;
    }

    /// Suma al stock sin tope, puede superar la capacidad maxima.
    pub fn restock_by(&mut self, amount: u64) {
        self.current_quantity += amount;
    }

    pub fn is_running_low(&self) -> bool {
        self.current_quantity < self.low_threshold
    }

    pub fn current_quantity(&self) -> u64 {
        self.current_quantity
    }

    pub fn max_quantity(&self) -> u64 {
        self.max_quantity
    }

    pub fn low_threshold(&self) -> u64 {
        self.low_threshold
    }
}
