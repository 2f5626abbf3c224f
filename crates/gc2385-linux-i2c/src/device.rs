//! Linux I2C device implementation
//!
//! This module provides the `LinuxI2c` struct that implements the
//! `RegisterBus` trait using Linux's i2c-dev interface.

use crate::error::{LinuxI2cError, Result};

use gc2385_core::bus::RegisterBus;
use gc2385_core::config::parse_number;
use gc2385_core::error::{Error as CoreError, Result as CoreResult};
use gc2385_core::regs;

use std::fs::{File, OpenOptions};
use std::os::unix::io::AsRawFd;

/// Linux i2c-dev ioctl constants
mod ioctl {
    use nix::{ioctl_read_bad, ioctl_write_ptr_bad};

    use super::I2cRdwrIoctlData;

    /// Query adapter functionality
    pub const I2C_FUNCS: u16 = 0x0705;
    /// Combined read/write transfer
    pub const I2C_RDWR: u16 = 0x0707;

    /// Adapter supports plain I2C messages
    pub const I2C_FUNC_I2C: libc::c_ulong = 0x0000_0001;
    /// Message flag: read from the slave
    pub const I2C_M_RD: u16 = 0x0001;

    ioctl_read_bad!(i2c_funcs, I2C_FUNCS, libc::c_ulong);
    ioctl_write_ptr_bad!(i2c_rdwr, I2C_RDWR, I2cRdwrIoctlData);
}

/// One message of a combined transfer
/// This must match the kernel's struct i2c_msg layout
#[repr(C)]
#[derive(Debug)]
struct I2cMsg {
    addr: u16,    // __u16 addr
    flags: u16,   // __u16 flags
    len: u16,     // __u16 len
    buf: *mut u8, // __u8 *buf
}

/// Argument of the I2C_RDWR ioctl
#[repr(C)]
#[derive(Debug)]
struct I2cRdwrIoctlData {
    msgs: *mut I2cMsg, // struct i2c_msg *msgs
    nmsgs: u32,        // __u32 nmsgs
}

/// Configuration for opening a Linux I2C device
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinuxI2cConfig {
    /// Device path (e.g., "/dev/i2c-1")
    pub device: String,
    /// 7-bit slave address (default: 0x37)
    pub addr: u16,
}

impl Default for LinuxI2cConfig {
    fn default() -> Self {
        Self {
            device: String::new(),
            addr: u16::from(regs::I2C_ADDR),
        }
    }
}

impl LinuxI2cConfig {
    /// Create a new configuration with the given device path
    pub fn new(device: impl Into<String>) -> Self {
        Self {
            device: device.into(),
            ..Default::default()
        }
    }

    /// Set the 7-bit slave address
    pub fn with_addr(mut self, addr: u16) -> Self {
        self.addr = addr;
        self
    }
}

/// GC2385 register bus on a Linux i2c-dev adapter
///
/// Every register access is a single combined I2C_RDWR transaction, so
/// the address phase and data phase of a read cannot be split by another
/// bus user.
pub struct LinuxI2c {
    /// File handle for the i2c-dev device
    file: File,
    /// 7-bit slave address
    addr: u16,
}

impl LinuxI2c {
    /// Open a Linux I2C device with the given configuration
    pub fn open(config: &LinuxI2cConfig) -> Result<Self> {
        if config.device.is_empty() {
            return Err(LinuxI2cError::NoDevice);
        }
        if config.addr > 0x7f {
            return Err(LinuxI2cError::InvalidParameter(format!(
                "address 0x{:x} is not a 7-bit address",
                config.addr
            )));
        }

        log::debug!("linux_i2c: Opening device {}", config.device);

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(&config.device)
            .map_err(|e| LinuxI2cError::OpenFailed {
                path: config.device.clone(),
                source: e,
            })?;

        let mut funcs: libc::c_ulong = 0;
        unsafe {
            ioctl::i2c_funcs(file.as_raw_fd(), &mut funcs)
                .map_err(|e| LinuxI2cError::FuncsFailed(std::io::Error::from_raw_os_error(e as i32)))?;
        }
        if funcs & ioctl::I2C_FUNC_I2C == 0 {
            return Err(LinuxI2cError::NoRawI2c(config.device.clone()));
        }

        log::info!(
            "linux_i2c: Opened {} (addr=0x{:02x})",
            config.device,
            config.addr
        );

        Ok(Self {
            file,
            addr: config.addr,
        })
    }

    /// Open a device with the default sensor address
    pub fn open_device(device: &str) -> Result<Self> {
        Self::open(&LinuxI2cConfig::new(device))
    }

    /// 7-bit slave address in use
    pub fn addr(&self) -> u16 {
        self.addr
    }

    /// Run one combined transfer
    fn transfer(&mut self, msgs: &mut [I2cMsg]) -> Result<()> {
        let data = I2cRdwrIoctlData {
            msgs: msgs.as_mut_ptr(),
            nmsgs: msgs.len() as u32,
        };

        unsafe { ioctl::i2c_rdwr(self.file.as_raw_fd(), &data) }.map_err(|e| {
            LinuxI2cError::TransferFailed {
                addr: self.addr,
                source: std::io::Error::from_raw_os_error(e as i32),
            }
        })?;
        Ok(())
    }

    /// Read one register: write the address, then read a byte
    pub fn read_reg(&mut self, reg: u8) -> Result<u8> {
        let mut reg_buf = [reg];
        let mut value = [0u8; 1];
        let mut msgs = [
            I2cMsg {
                addr: self.addr,
                flags: 0,
                len: 1,
                buf: reg_buf.as_mut_ptr(),
            },
            I2cMsg {
                addr: self.addr,
                flags: ioctl::I2C_M_RD,
                len: 1,
                buf: value.as_mut_ptr(),
            },
        ];
        self.transfer(&mut msgs)?;
        Ok(value[0])
    }

    /// Write one register
    pub fn write_reg(&mut self, reg: u8, value: u8) -> Result<()> {
        let mut buf = [reg, value];
        let mut msgs = [I2cMsg {
            addr: self.addr,
            flags: 0,
            len: 2,
            buf: buf.as_mut_ptr(),
        }];
        self.transfer(&mut msgs)
    }
}

impl RegisterBus for LinuxI2c {
    fn read(&mut self, addr: u8) -> CoreResult<u8> {
        self.read_reg(addr).map_err(|e| {
            log::debug!("linux_i2c: {}", e);
            CoreError::read_failed(addr)
        })
    }

    fn write(&mut self, addr: u8, value: u8) -> CoreResult<()> {
        self.write_reg(addr, value).map_err(|e| {
            log::debug!("linux_i2c: {}", e);
            CoreError::write_failed(addr, value)
        })
    }

    fn delay_us(&mut self, us: u32) {
        std::thread::sleep(std::time::Duration::from_micros(us as u64));
    }
}

/// Parse bus options from a list of key-value pairs
pub fn parse_options(options: &[(&str, &str)]) -> std::result::Result<LinuxI2cConfig, String> {
    let mut config = LinuxI2cConfig::default();

    for (key, value) in options {
        match *key {
            "dev" => {
                config.device = value.to_string();
            }
            "addr" => {
                let addr = parse_number(value)
                    .map_err(|_| format!("Invalid addr value: {}", value))?;
                if addr > 0x7f {
                    return Err(format!("Invalid I2C address: 0x{:x} (must be 7-bit)", addr));
                }
                config.addr = addr as u16;
            }
            _ => {
                log::warn!("linux_i2c: Unknown option: {}={}", key, value);
            }
        }
    }

    if config.device.is_empty() {
        return Err("No device specified. Use dev=/dev/i2c-N".to_string());
    }

    Ok(config)
}
