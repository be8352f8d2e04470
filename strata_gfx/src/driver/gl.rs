//! GL enum values used by the format mapping

// Sized internal formats (normalized)
pub const R8: u32 = 0x8229;
pub const RG8: u32 = 0x822B;
pub const RGBA8: u32 = 0x8058;
pub const R16: u32 = 0x822A;
pub const RG16: u32 = 0x822C;
pub const RGBA16: u32 = 0x805B;

// Sized internal formats (float)
pub const R16F: u32 = 0x822D;
pub const RG16F: u32 = 0x822F;
pub const RGBA16F: u32 = 0x881A;
pub const R32F: u32 = 0x822E;
pub const RG32F: u32 = 0x8230;
pub const RGB32F: u32 = 0x8815;
pub const RGBA32F: u32 = 0x8814;

// Sized internal formats (integer)
pub const R8I: u32 = 0x8231;
pub const R8UI: u32 = 0x8232;
pub const RG8I: u32 = 0x8237;
pub const RG8UI: u32 = 0x8238;
pub const RGBA8I: u32 = 0x8D8E;
pub const RGBA8UI: u32 = 0x8D7C;
pub const R16I: u32 = 0x8233;
pub const R16UI: u32 = 0x8234;
pub const RG16I: u32 = 0x8239;
pub const RG16UI: u32 = 0x823A;
pub const RGBA16I: u32 = 0x8D88;
pub const RGBA16UI: u32 = 0x8D76;
pub const R32I: u32 = 0x8235;
pub const R32UI: u32 = 0x8236;
pub const RG32I: u32 = 0x823B;
pub const RG32UI: u32 = 0x823C;
pub const RGB32I: u32 = 0x8D83;
pub const RGB32UI: u32 = 0x8D71;
pub const RGBA32I: u32 = 0x8D82;
pub const RGBA32UI: u32 = 0x8D70;

// Transfer formats
pub const RED: u32 = 0x1903;
pub const RG: u32 = 0x8227;
pub const RGB: u32 = 0x1907;
pub const RGBA: u32 = 0x1908;
pub const RED_INTEGER: u32 = 0x8D94;
pub const RG_INTEGER: u32 = 0x8228;
pub const RGB_INTEGER: u32 = 0x8D98;
pub const RGBA_INTEGER: u32 = 0x8D99;

// Component types
pub const BYTE: u32 = 0x1400;
pub const UNSIGNED_BYTE: u32 = 0x1401;
pub const SHORT: u32 = 0x1402;
pub const UNSIGNED_SHORT: u32 = 0x1403;
pub const INT: u32 = 0x1404;
pub const UNSIGNED_INT: u32 = 0x1405;
pub const FLOAT: u32 = 0x1406;
pub const HALF_FLOAT: u32 = 0x140B;
