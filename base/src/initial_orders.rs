//! The initial orders: the bootstrap loader wired into the top of
//! store module 0.
//!
//! ## Listing
//!
//! <pre>
//! Loc    Order      Effect
//! 8180   -3         ** Load count; also the base for B-modified stores
//! 8181    0 8180    ** B := -3
//! 8182    4 8189    ** A := marker (the word at 8189)
//! 8183   15 2048    ** Read a tape character into A
//! 8184    9 8186    ** Marker reached the sign bit: word complete
//! 8185    8 8183    ** Otherwise read another character
//! 8186   15 2048    ** Read the final character of the word
//! 8187   /5 8180    ** Store A at 8180 + B
//! 8188   10 1       ** B := B + 1
//! 8189    4 1       ** A := B
//! 8190    9 8182    ** Loop while B is negative
//! 8191    8 8177    ** Enter the program just loaded
//! </pre>
//!
//! So the orders read three words from tape, store them in 8177,
//! 8178 and 8179, then jump to 8177.  A word is made up of however
//! many characters it takes to shift the marker bit into the sign
//! position, plus one more.

use super::instruction::{Function, Instruction};
use super::types::Address;
use super::word::Word;

/// Address of the first word of the initial orders.
pub const INITIAL_ORDERS_START: Address = Address::new(8180);

/// Number of words occupied by the initial orders.
pub const INITIAL_ORDERS_LEN: usize = 12;

/// The usual starting address; the first instruction of the loader.
pub const INITIAL_ORDERS_ENTRY: Address = Address::new(8181);

fn order(b_modified: bool, function: Function, operand: u16) -> Word {
    Instruction::new(b_modified, function, operand).bits()
}

/// Returns the initial orders, to be placed in store starting at
/// [`INITIAL_ORDERS_START`].
pub fn initial_orders() -> [Word; INITIAL_ORDERS_LEN] {
    use Function::*;
    [
        Word::from_signed(-3),
        order(false, LoadB, 8180),
        order(false, LoadA, 8189),
        order(false, InputOutput, 2048),
        order(false, JumpIfNegative, 8186),
        order(false, Jump, 8183),
        order(false, InputOutput, 2048),
        order(true, StoreA, 8180),
        order(false, Increment, 1),
        order(false, LoadA, 1),
        order(false, JumpIfNegative, 8182),
        order(false, Jump, 8177),
    ]
}

/// True if `address` lies within the initial orders.  Priority level 1
/// programs may not overwrite these locations.
pub fn is_initial_orders(address: Address) -> bool {
    let start = INITIAL_ORDERS_START.bits();
    (start..start + INITIAL_ORDERS_LEN as u16).contains(&address.bits())
}
