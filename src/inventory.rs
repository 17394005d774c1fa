//! Almacen de ingredientes de la cafetera

use std::collections::HashMap;

use crate::errors::CoffeeMachineError;
use crate::ingredient::Ingredient;

/// Dueño exclusivo de los registros de ingredientes. Toda mutacion de stock
/// pasa por este mapa, protegido por el lock global de la maquina.
pub struct Inventory {
    ingredients: HashMap<String, Ingredient>,
}

impl Inventory {
    pub fn new() -> Inventory {
        Inventory {
            ingredients: HashMap::new(),
        }
    }

    /// Da de alta un ingrediente con el stock al maximo. Si ya existia se
    /// rechaza el alta y el registro original queda intacto.
    pub fn register(&mut self, name: &str, max_quantity: u64) -> Result<(), CoffeeMachineError> {
        if self.ingredients.contains_key(name) {
            return Err(CoffeeMachineError::IngredientAlreadyPresent(
                name.to_string(),
            ));
        }
        self.ingredients
            .insert(name.to_string(), Ingredient::new(max_quantity));
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.ingredients.contains_key(name)
    }

    /// Sube el umbral de alerta del ingrediente. Nombres desconocidos se ignoran.
    pub fn raise_threshold(&mut self, name: &str, minimum_requirement: u64) {
        if let Some(ingredient) = self.ingredients.get_mut(name) {
            ingredient.raise_threshold(minimum_requirement);
        }
    }

    pub fn is_sufficient(&self, name: &str, quantity: u64) -> Result<bool, CoffeeMachineError> {
        let ingredient = self
            .ingredients
            .get(name)
            .ok_or_else(|| CoffeeMachineError::IngredientNotFound(name.to_string()))?;
        Ok(ingredient.is_sufficient(quantity))
    }

    /// Descuenta stock sin verificar suficiencia. El llamador debe haberla
    /// verificado dentro de la misma seccion critica.
    pub fn consume(&mut self, name: &str, quantity: u64) -> Result<(), CoffeeMachineError> {
        let ingredient = self
            .ingredients
            .get_mut(name)
            .ok_or_else(|| CoffeeMachineError::IngredientNotFound(name.to_string()))?;
        ingredient.consume(quantity);
        Ok(())
    }

    /// Repone el ingrediente a su capacidad maxima. Nombres desconocidos se ignoran.
    pub fn restock_to_full(&mut self, name: &str) {
        if let Some(ingredient) = self.ingredients.get_mut(name) {
            ingredient.restock_to_full();
        }
    }

    pub fn restock_all_to_full(&mut self) {
        for ingredient in self.ingredients.values_mut() {
            ingredient.restock_to_full();
        }
    }

    /// Suma stock sin tope. Nombres desconocidos se ignoran.
    pub fn restock_by(&mut self, name: &str, amount: u64) {
        if let Some(ingredient) = self.ingredients.get_mut(name) {
            ingredient.restock_by(amount);
        }
    }

    pub fn is_running_low(&self, name: &str) -> Result<bool, CoffeeMachineError> {
        let ingredient = self
            .ingredients
            .get(name)
            .ok_or_else(|| CoffeeMachineError::IngredientNotFound(name.to_string()))?;
        Ok(ingredient.is_running_low())
    }

    /// Ingredientes por debajo de su umbral, con (stock actual, capacidad maxima).
    pub fn running_low(&self) -> HashMap<String, (u64, u64)> {
        self.ingredients
            .iter()
            .filter(|(_, ingredient)| ingredient.is_running_low())
            .map(|(name, ingredient)| {
                (
                    name.clone(),
                    (ingredient.current_quantity(), ingredient.max_quantity()),
                )
            })
            .collect()
    }

    /// Foto del stock actual, para reportes. No se usa para admitir pedidos.
    pub fn snapshot(&self) -> HashMap<String, u64> {
        self.ingredients
            .iter()
            .map(|(name, ingredient)| (name.clone(), ingredient.current_quantity()))
            .collect()
    }
}
