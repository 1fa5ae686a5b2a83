pub mod crop;
pub mod cropper;
pub mod frame;
pub mod resolution;
pub mod y4m_encoder;
pub mod y4m_format;
pub mod yuv;
