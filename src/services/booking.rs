// 预订跳转
//
// 站点不直接处理订单，而是把预订表单整理成消息，跳转到 WhatsApp 对话。

use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;

use crate::models::validation::{StringValidator, ValidationError};
use crate::models::{Language, Vehicle};

const BOOKING_BASE_URL: &str = "https://wa.me";

lazy_static! {
    // 国际格式电话：可选 +，7-15 位数字，允许空格、连字符和括号
    static ref PHONE_RE: Regex = Regex::new(r"^\+?[0-9(][0-9\s\-()]{5,20}$").unwrap();
}

/// 预订表单
#[derive(Debug, Clone, Deserialize)]
pub struct BookingRequest {
    pub vehicle_id: String,
    pub name: String,
    pub phone: String,
    pub pickup_date: NaiveDate,
    pub return_date: NaiveDate,
    pub message: Option<String>,
    pub lang: Option<Language>,
}

impl BookingRequest {
    /// 校验表单；`today` 由调用方传入以便测试
    pub fn validate(&self, today: NaiveDate) -> Result<(), ValidationError> {
        StringValidator::validate_name(&self.name)?;
        validate_phone(&self.phone)?;

        if self.return_date < self.pickup_date {
            return Err(ValidationError::DatesOutOfOrder);
        }
        if self.pickup_date < today {
            return Err(ValidationError::PickupInPast);
        }

        Ok(())
    }

    /// 租期天数，同一天取还按一天计
    pub fn rental_days(&self) -> i64 {
        (self.return_date - self.pickup_date).num_days().max(1)
    }
}

pub fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    let digits = phone.chars().filter(char::is_ascii_digit).count();
    if !PHONE_RE.is_match(phone.trim()) || !(7..=15).contains(&digits) {
        return Err(ValidationError::InvalidPhone(phone.to_string()));
    }
    Ok(())
}

/// 车辆详情页的快速预订链接（无表单）
pub fn quick_booking_url(booking_phone: &str, vehicle: &Vehicle, lang: Language) -> String {
    quick_booking_url_for(booking_phone, &vehicle.display_name(), lang)
}

/// 按车辆显示名称生成快速预订链接，列表页使用
pub fn quick_booking_url_for(booking_phone: &str, vehicle_name: &str, lang: Language) -> String {
    let text = match lang {
        Language::En => format!("Hello! I would like to rent the {}.", vehicle_name),
        Language::Ru => format!("Здравствуйте! Хочу арендовать {}.", vehicle_name),
        Language::Tr => format!("Merhaba! {} kiralamak istiyorum.", vehicle_name),
    };
    whatsapp_url(booking_phone, &text)
}

/// 根据完整表单生成预订链接
pub fn booking_redirect_url(booking_phone: &str, vehicle: &Vehicle, request: &BookingRequest) -> String {
    let lang = request.lang.unwrap_or_default();
    let days = request.rental_days();
    let total = vehicle.price_per_day * days;

    let mut lines = match lang {
        Language::En => vec![
            format!("Booking request: {}", vehicle.display_name()),
            format!("Name: {}", request.name.trim()),
            format!("Phone: {}", request.phone.trim()),
            format!("Dates: {} - {} ({} days)", request.pickup_date, request.return_date, days),
            format!("Estimated total: {}", total),
        ],
        Language::Ru => vec![
            format!("Заявка на бронирование: {}", vehicle.display_name()),
            format!("Имя: {}", request.name.trim()),
            format!("Телефон: {}", request.phone.trim()),
            format!("Даты: {} - {} ({} дн.)", request.pickup_date, request.return_date, days),
            format!("Примерная стоимость: {}", total),
        ],
        Language::Tr => vec![
            format!("Rezervasyon talebi: {}", vehicle.display_name()),
            format!("Ad: {}", request.name.trim()),
            format!("Telefon: {}", request.phone.trim()),
            format!("Tarihler: {} - {} ({} gün)", request.pickup_date, request.return_date, days),
            format!("Tahmini toplam: {}", total),
        ],
    };

    if let Some(message) = request.message.as_deref().map(str::trim).filter(|m| !m.is_empty()) {
        lines.push(message.to_string());
    }

    whatsapp_url(booking_phone, &lines.join("\n"))
}

fn whatsapp_url(booking_phone: &str, text: &str) -> String {
    format!(
        "{}/{}?text={}",
        BOOKING_BASE_URL,
        booking_phone,
        urlencoding::encode(text)
    )
}
