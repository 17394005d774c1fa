//! Recetario de la cafetera

use std::collections::HashMap;

use crate::errors::CoffeeMachineError;
use crate::inventory::Inventory;

/// Requerimientos de ingredientes de una bebida. Inmutable una vez definida.
pub struct Recipe {
    beverage: String,
    required_ingredients: HashMap<String, u64>,
}

impl Recipe {
    pub fn new(beverage: &str, required_ingredients: HashMap<String, u64>) -> Recipe {
        Recipe {
            beverage: beverage.to_string(),
            required_ingredients,
        }
    }

    /// Verifica presencia y suficiencia de cada ingrediente requerido, en el
    /// orden de iteracion del mapa, cortando en la primera falla.
    pub fn verify(&self, inventory: &Inventory) -> Result<(), CoffeeMachineError> {
        for (ingredient, required) in &self.required_ingredients {
            match inventory.is_sufficient(ingredient, *required) {
                Err(_) => {
                    return Err(CoffeeMachineError::IngredientNotAvailable {
                        beverage: self.beverage.clone(),
                        ingredient: ingredient.clone(),
                    });
                }
                Ok(false) => {
                    return Err(CoffeeMachineError::NotEnoughIngredient {
                        beverage: self.beverage.clone(),
                        ingredient: ingredient.clone(),
                        required: *required,
                    });
                }
                Ok(true) => {}
            }
        }
        Ok(())
    }

    /// Descuenta todos los requerimientos del almacen. Solo debe llamarse
    /// inmediatamente despues de un `verify` exitoso, bajo el mismo lock.
    pub fn commit(&self, inventory: &mut Inventory) -> Result<(), CoffeeMachineError> {
        for (ingredient, required) in &self.required_ingredients {
            inventory.consume(ingredient, *required)?;
        }
        Ok(())
    }

    pub fn largest_requirement_of(&self, ingredient: &str) -> u64 {
        self.required_ingredients
            .get(ingredient)
            .copied()
            .unwrap_or(0)
    }
}

/// Mapa de bebidas soportadas a sus recetas. De solo lectura despues de la
/// inicializacion.
pub struct RecipeBook {
    recipes: HashMap<String, Recipe>,
}

impl RecipeBook {
    pub fn new() -> RecipeBook {
        RecipeBook {
            recipes: HashMap::new(),
        }
    }

    /// Define la receta de una bebida. No valida que los ingredientes existan,
    /// eso recien falla al verificar un pedido.
    pub fn define(&mut self, beverage: &str, required_ingredients: HashMap<String, u64>) {
        self.recipes.insert(
            beverage.to_string(),
            Recipe::new(beverage, required_ingredients),
        );
    }

    pub fn contains(&self, beverage: &str) -> bool {
        self.recipes.contains_key(beverage)
    }

    pub fn verify(
        &self,
        beverage: &str,
        inventory: &Inventory,
    ) -> Result<(), CoffeeMachineError> {
        let recipe = self
            .recipes
            .get(beverage)
            .ok_or_else(|| CoffeeMachineError::BeverageNotSupported(beverage.to_string()))?;
        recipe.verify(inventory)
    }

    pub fn commit(
        &self,
        beverage: &str,
        inventory: &mut Inventory,
    ) -> Result<(), CoffeeMachineError> {
        let recipe = self
            .recipes
            .get(beverage)
            .ok_or_else(|| CoffeeMachineError::BeverageNotSupported(beverage.to_string()))?;
        recipe.commit(inventory)
    }

    /// Nombres de las bebidas soportadas, ordenados alfabeticamente.
    pub fn options(&self) -> Vec<String> {
        let mut options: Vec<String> = self.recipes.keys().cloned().collect();
        options.sort();
        options
    }

    /// Mayor cantidad requerida del ingrediente entre todas las recetas.
    pub fn largest_requirement_of(&self, ingredient: &str) -> u64 {
        self.recipes
            .values()
            .map(|recipe| recipe.largest_requirement_of(ingredient))
            .max()
            .unwrap_or(0)
    }
}
