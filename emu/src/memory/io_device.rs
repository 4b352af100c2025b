use crate::fault::Fault;

/// Byte-level access seam between the interpreter and whatever backs its
/// address space.
pub trait IoDevice {
    type Address;
    type Value;

    fn read_at(&self, address: Self::Address) -> Result<Self::Value, Fault>;
    fn write_at(&mut self, address: Self::Address, value: Self::Value) -> Result<(), Fault>;
}
