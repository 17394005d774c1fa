//! Representacion de un pedido admitido

use std::sync::mpsc::{Receiver, Sender};

use crate::errors::CoffeeMachineError;

/// Pedido ya admitido por la maquina, en espera de un dispenser. Vive solo
/// durante el ciclo admision-preparacion.
#[derive(Debug)]
pub struct Order {
    pub id: usize,
    pub beverage: String,
    result_sender: Sender<String>,
}

impl Order {
    pub fn new(id: usize, beverage: String, result_sender: Sender<String>) -> Order {
        Order {
            id,
            beverage,
            result_sender,
        }
    }

    /// Entrega el resultado al que hizo el pedido. Si el ticket fue
    /// descartado no hay nadie esperando y el mensaje se pierde.
    pub fn deliver(self, message: String) {
        let _ = self.result_sender.send(message);
    }
}

/// Comprobante que recibe el llamador al admitirse su pedido.
#[derive(Debug)]
pub struct OrderTicket {
    pub id: usize,
    result_receiver: Receiver<String>,
}

impl OrderTicket {
    pub fn new(id: usize, result_receiver: Receiver<String>) -> OrderTicket {
        OrderTicket {
            id,
            result_receiver,
        }
    }

    /// Bloquea hasta que el pedido termina y devuelve el mensaje de resultado.
    pub fn wait(self) -> Result<String, CoffeeMachineError> {
        self.result_receiver
            .recv()
            .map_err(|_| CoffeeMachineError::ChannelError)
    }
}
