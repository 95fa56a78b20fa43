pub mod code;

pub use code::{
    ImageCodeQuery, ImageCodeResponse, ImageFormat, SmsCodeQuery, SmsCodeResponse, VerifyCodeRequest,
    VerifyCodeResponse,
};
