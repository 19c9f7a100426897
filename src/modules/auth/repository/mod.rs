pub mod contact;
pub mod otp;
