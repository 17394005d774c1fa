use std::fmt;

#[derive(Debug, PartialEq, Eq)]
pub enum CoffeeMachineError {
    BeverageNotSupported(String),
    IngredientNotAvailable {
        beverage: String,
        ingredient: String,
    },
    NotEnoughIngredient {
        beverage: String,
        ingredient: String,
        required: u64,
    },
    RestockingInProgress {
        seconds_left: u64,
    },
    NoOutletAvailable,
    AlreadyRestocking,
    IngredientAlreadyPresent(String),
    IngredientNotFound(String),
    InvalidConfiguration(String),
    FileReaderError,
    EmptyQueueWhenNotExpected,
    LockError,
    ChannelError,
}

impl<T> From<std::sync::PoisonError<T>> for CoffeeMachineError {
    fn from(_: std::sync::PoisonError<T>) -> Self {
        CoffeeMachineError::LockError
    }
}

impl fmt::Display for CoffeeMachineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoffeeMachineError::BeverageNotSupported(beverage) => {
                write!(f, "Beverage: {} is not served by the machine.", beverage)
            }
            CoffeeMachineError::IngredientNotAvailable {
                beverage,
                ingredient,
            } => {
                write!(
                    f,
                    "{} can not be prepared because {} is not available.",
                    beverage, ingredient
                )
            }
            CoffeeMachineError::NotEnoughIngredient {
                beverage,
                ingredient,
                ..
            } => {
                write!(
                    f,
                    "{} can not be prepared because {} is not sufficient.",
                    beverage, ingredient
                )
            }
            CoffeeMachineError::RestockingInProgress { seconds_left } => {
                write!(
                    f,
                    "Machine is restocking ingredients. Please wait for {} seconds",
                    seconds_left
                )
            }
            CoffeeMachineError::NoOutletAvailable => {
                write!(
                    f,
                    "All outlets are busy serving. Please wait for an outlet to get free"
                )
            }
            CoffeeMachineError::AlreadyRestocking => {
                write!(
                    f,
                    "Already restocking. Please wait for ingredients to run low again."
                )
            }
            CoffeeMachineError::IngredientAlreadyPresent(ingredient) => {
                write!(f, "Ingredient {} is already in the machine.", ingredient)
            }
            CoffeeMachineError::IngredientNotFound(ingredient) => {
                write!(f, "Ingredient {} is not in the machine.", ingredient)
            }
            CoffeeMachineError::InvalidConfiguration(reason) => {
                write!(f, "Invalid machine configuration: {}", reason)
            }
            CoffeeMachineError::FileReaderError => {
                write!(f, "Could not read the settings file")
            }
            CoffeeMachineError::EmptyQueueWhenNotExpected => {
                write!(f, "The orders queue was empty when it should not be")
            }
            CoffeeMachineError::LockError => write!(f, "A machine lock was poisoned"),
            CoffeeMachineError::ChannelError => {
                write!(f, "The order result channel was closed")
            }
        }
    }
}
