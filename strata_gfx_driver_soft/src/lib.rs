/*!
# Strata GFX - Software Driver Backend

CPU implementation of the `strata_gfx` driver trait.

The software driver emulates the buffer and texture-buffer entry points of
a GL-style driver, including the error rules and the capability tiers
(direct state access, range maps, device copies, texture buffers). It runs
headless, which makes it the driver of choice for tools and tests.

```no_run
use strata_gfx::strata::{DeviceConfig, DeviceContext};
use strata_gfx::strata::buffer::BufferDesc;
use strata_gfx_driver_soft::{SoftDriver, SoftDriverConfig};

let driver = SoftDriver::new(SoftDriverConfig::legacy());
let monitor = driver.monitor();
let ctx = DeviceContext::new(driver, DeviceConfig::default())?;
let buffer = ctx.create_buffer(BufferDesc::vertex(64), None)?;
assert_eq!(monitor.live_buffers(), 1);
# drop(buffer);
# Ok::<(), strata_gfx::strata::Error>(())
```
*/

mod name_allocator;
mod soft_buffer;
mod soft_config;
mod soft_driver;
mod soft_stats;
mod soft_texture;

pub use soft_buffer::{SoftMapping, POISON};
pub use soft_config::{SoftDriverConfig, DEFAULT_MAX_BUFFER_SIZE};
pub use soft_driver::SoftDriver;
pub use soft_stats::{SoftMonitor, SoftStats};
pub use soft_texture::TexelView;
