//! Register bus trait definitions

use crate::error::Result;

/// One entry of a register table: write `value` to `addr`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RegVal {
    /// Register address (page relative unless it is a system register)
    pub addr: u8,
    /// Value to write
    pub value: u8,
}

impl RegVal {
    /// Create a new table entry
    pub const fn new(addr: u8, value: u8) -> Self {
        Self { addr, value }
    }
}

/// Byte-addressed register access to one sensor
///
/// This trait represents the control channel to a physical sensor (CCI/I2C
/// with 8-bit addresses and 8-bit data). Implementations own the transport;
/// the control core only issues single register reads and writes.
///
/// ## Example: emulated sensor
///
/// ```ignore
/// impl RegisterBus for MySensor {
///     fn read(&mut self, addr: u8) -> Result<u8> {
///         Ok(self.regs[addr as usize])
///     }
///
///     fn write(&mut self, addr: u8, value: u8) -> Result<()> {
///         self.regs[addr as usize] = value;
///         Ok(())
///     }
///
///     fn delay_us(&mut self, _us: u32) {}
/// }
/// ```
pub trait RegisterBus {
    /// Read a single register
    fn read(&mut self, addr: u8) -> Result<u8>;

    /// Write a single register
    fn write(&mut self, addr: u8, value: u8) -> Result<()>;

    /// Write a register table in order
    ///
    /// Stops at the first failing write and returns its error; entries
    /// after it are not written.
    fn write_table(&mut self, table: &[RegVal]) -> Result<()> {
        for (index, reg) in table.iter().enumerate() {
            if let Err(e) = self.write(reg.addr, reg.value) {
                log::error!(
                    "table write {} of {} failed (0x{:02X} <- 0x{:02X}): {}",
                    index + 1,
                    table.len(),
                    reg.addr,
                    reg.value,
                    e
                );
                return Err(e);
            }
        }
        Ok(())
    }

    /// Delay for the specified number of microseconds
    fn delay_us(&mut self, us: u32);
}

impl<B: RegisterBus + ?Sized> RegisterBus for &mut B {
    fn read(&mut self, addr: u8) -> Result<u8> {
        (**self).read(addr)
    }

    fn write(&mut self, addr: u8, value: u8) -> Result<()> {
        (**self).write(addr, value)
    }

    fn write_table(&mut self, table: &[RegVal]) -> Result<()> {
        (**self).write_table(table)
    }

    fn delay_us(&mut self, us: u32) {
        (**self).delay_us(us)
    }
}

// Blanket impl for boxed buses to allow trait objects
#[cfg(feature = "alloc")]
impl RegisterBus for alloc::boxed::Box<dyn RegisterBus + Send> {
    fn read(&mut self, addr: u8) -> Result<u8> {
        (**self).read(addr)
    }

    fn write(&mut self, addr: u8, value: u8) -> Result<()> {
        (**self).write(addr, value)
    }

    fn write_table(&mut self, table: &[RegVal]) -> Result<()> {
        (**self).write_table(table)
    }

    fn delay_us(&mut self, us: u32) {
        (**self).delay_us(us)
    }
}
