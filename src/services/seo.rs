// SEO 元数据
//
// - 各语言页面的标题、描述、canonical 与 hreflang 备用链接
// - schema.org JSON-LD（车辆、租车公司、面包屑）
// - sitemap.xml

use std::io::Cursor;

use anyhow::Result;
use quick_xml::events::{BytesDecl, BytesText, Event};
use quick_xml::Writer;
use serde::Serialize;
use serde_json::{json, Value};

use crate::config::AppConfig;
use crate::models::{Language, Vehicle, VehicleKind};
use crate::services::storage::resolve_image;

const PRICE_CURRENCY: &str = "USD";
const SITEMAP_NS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";
const XHTML_NS: &str = "http://www.w3.org/1999/xhtml";

/// 站点静态页面
pub const PAGE_SLUGS: [&str; 5] = ["home", "cars", "buses", "about", "contact"];

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct AlternateLink {
    pub hreflang: String,
    pub href: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PageMetadata {
    pub slug: String,
    pub lang: Language,
    pub title: String,
    pub description: String,
    pub canonical_url: String,
    pub alternates: Vec<AlternateLink>,
}

fn page_copy(slug: &str, lang: Language) -> Option<(&'static str, &'static str)> {
    let copy = match (slug, lang) {
        ("home", Language::En) => ("Car and bus rental", "Rent cars, minibuses and coaches at fair daily prices."),
        ("home", Language::Ru) => ("Аренда автомобилей и автобусов", "Аренда легковых автомобилей, микроавтобусов и автобусов по честным ценам."),
        ("home", Language::Tr) => ("Araç ve otobüs kiralama", "Uygun günlük fiyatlarla otomobil, minibüs ve otobüs kiralayın."),
        ("cars", Language::En) => ("Cars for rent", "Economy, business and SUV cars with daily pricing."),
        ("cars", Language::Ru) => ("Автомобили в аренду", "Эконом, бизнес и внедорожники с посуточной оплатой."),
        ("cars", Language::Tr) => ("Kiralık otomobiller", "Günlük fiyatlarla ekonomi, iş ve SUV araçlar."),
        ("buses", Language::En) => ("Buses for rent", "Minibuses and coaches for groups, tours and transfers."),
        ("buses", Language::Ru) => ("Автобусы в аренду", "Микроавтобусы и автобусы для групп, туров и трансферов."),
        ("buses", Language::Tr) => ("Kiralık otobüsler", "Gruplar, turlar ve transferler için minibüs ve otobüsler."),
        ("about", Language::En) => ("About us", "Who we are and how our rental service works."),
        ("about", Language::Ru) => ("О компании", "Кто мы и как работает наш прокат."),
        ("about", Language::Tr) => ("Hakkımızda", "Biz kimiz ve kiralama hizmetimiz nasıl çalışır."),
        ("contact", Language::En) => ("Contact", "Get in touch to book a vehicle or ask a question."),
        ("contact", Language::Ru) => ("Контакты", "Свяжитесь с нами, чтобы забронировать автомобиль или задать вопрос."),
        ("contact", Language::Tr) => ("İletişim", "Araç rezervasyonu veya sorularınız için bize ulaşın."),
        _ => return None,
    };
    Some(copy)
}

fn page_path(slug: &str) -> &str {
    if slug == "home" {
        ""
    } else {
        slug
    }
}

/// 页面在指定语言下的绝对 URL
pub fn localized_url(base_url: &str, lang: Language, path: &str) -> String {
    let path = path.trim_matches('/');
    if path.is_empty() {
        format!("{}/{}", base_url, lang.code())
    } else {
        format!("{}/{}/{}", base_url, lang.code(), path)
    }
}

/// 所有语言的备用链接，外加指向默认语言的 `x-default`
fn alternates(base_url: &str, path: &str) -> Vec<AlternateLink> {
    Language::ALL
        .iter()
        .map(|lang| AlternateLink {
            hreflang: lang.code().to_string(),
            href: localized_url(base_url, *lang, path),
        })
        .chain(std::iter::once(AlternateLink {
            hreflang: "x-default".to_string(),
            href: localized_url(base_url, Language::default(), path),
        }))
        .collect()
}

/// 静态页面元数据，未知页面返回 `None`
pub fn page_metadata(config: &AppConfig, slug: &str, lang: Language) -> Option<PageMetadata> {
    let (title, description) = page_copy(slug, lang)?;
    let path = page_path(slug);

    Some(PageMetadata {
        slug: slug.to_string(),
        lang,
        title: format!("{} | {}", title, config.site_name),
        description: description.to_string(),
        canonical_url: localized_url(&config.public_base_url, lang, path),
        alternates: alternates(&config.public_base_url, path),
    })
}

fn vehicle_path(vehicle: &Vehicle) -> String {
    let section = match vehicle.get_kind() {
        Ok(VehicleKind::Bus) => "buses",
        _ => "cars",
    };
    format!("{}/{}", section, vehicle.slug)
}

/// 车辆详情页元数据
pub fn vehicle_metadata(config: &AppConfig, vehicle: &Vehicle, lang: Language) -> PageMetadata {
    let path = vehicle_path(vehicle);
    let description = vehicle
        .description
        .clone()
        .unwrap_or_else(|| format!("{} {}, {} seats", vehicle.display_name(), vehicle.year, vehicle.seats));

    PageMetadata {
        slug: vehicle.slug.clone(),
        lang,
        title: format!("{} {} | {}", vehicle.display_name(), vehicle.year, config.site_name),
        description,
        canonical_url: localized_url(&config.public_base_url, lang, &path),
        alternates: alternates(&config.public_base_url, &path),
    }
}

fn absolute_url(base_url: &str, url: &str) -> String {
    if url.starts_with('/') {
        format!("{}{}", base_url, url)
    } else {
        url.to_string()
    }
}

/// schema.org `Car` / `BusOrCoach`，附带日租 `Offer`
pub fn vehicle_schema(config: &AppConfig, vehicle: &Vehicle, lang: Language) -> Value {
    let schema_type = match vehicle.get_kind() {
        Ok(VehicleKind::Bus) => "BusOrCoach",
        _ => "Car",
    };
    let gallery = vehicle.get_gallery().unwrap_or_default();
    let image = resolve_image(vehicle.image_url.as_deref(), &gallery);
    let url = localized_url(&config.public_base_url, lang, &vehicle_path(vehicle));

    let mut schema = json!({
        "@context": "https://schema.org",
        "@type": schema_type,
        "name": vehicle.display_name(),
        "brand": { "@type": "Brand", "name": vehicle.brand },
        "model": vehicle.model,
        "vehicleModelDate": vehicle.year.to_string(),
        "seatingCapacity": vehicle.seats,
        "image": absolute_url(&config.public_base_url, &image),
        "url": url,
        "offers": {
            "@type": "Offer",
            "price": vehicle.price_per_day,
            "priceCurrency": PRICE_CURRENCY,
            "availability": "https://schema.org/InStock",
            "url": url,
            "priceSpecification": {
                "@type": "UnitPriceSpecification",
                "price": vehicle.price_per_day,
                "priceCurrency": PRICE_CURRENCY,
                "unitCode": "DAY"
            }
        }
    });

    if let Some(ref fuel) = vehicle.fuel {
        schema["fuelType"] = json!(fuel);
    }
    if let Some(ref transmission) = vehicle.transmission {
        schema["vehicleTransmission"] = json!(transmission);
    }
    if let Some(ref description) = vehicle.description {
        schema["description"] = json!(description);
    }

    schema
}

/// schema.org `AutoRental`
pub fn organization_schema(config: &AppConfig) -> Value {
    json!({
        "@context": "https://schema.org",
        "@type": "AutoRental",
        "name": config.site_name,
        "url": config.public_base_url,
        "telephone": format!("+{}", config.booking_phone),
        "availableLanguage": Language::ALL.iter().map(Language::code).collect::<Vec<_>>(),
    })
}

/// schema.org `BreadcrumbList`，`items` 为 (名称, URL)
pub fn breadcrumb_schema(items: &[(String, String)]) -> Value {
    let elements: Vec<Value> = items
        .iter()
        .enumerate()
        .map(|(index, (name, url))| {
            json!({
                "@type": "ListItem",
                "position": index + 1,
                "name": name,
                "item": url,
            })
        })
        .collect();

    json!({
        "@context": "https://schema.org",
        "@type": "BreadcrumbList",
        "itemListElement": elements,
    })
}

/// 车辆详情页面包屑：首页 > 分类 > 车辆
pub fn vehicle_breadcrumbs(config: &AppConfig, vehicle: &Vehicle, lang: Language) -> Value {
    let section = match vehicle.get_kind() {
        Ok(VehicleKind::Bus) => "buses",
        _ => "cars",
    };
    let crumb = |slug: &str| {
        let name = page_copy(slug, lang).map(|(title, _)| title).unwrap_or(slug);
        (name.to_string(), localized_url(&config.public_base_url, lang, page_path(slug)))
    };

    breadcrumb_schema(&[
        crumb("home"),
        crumb(section),
        (
            vehicle.display_name(),
            localized_url(&config.public_base_url, lang, &vehicle_path(vehicle)),
        ),
    ])
}

/// 生成 sitemap.xml：每个页面和车辆在每种语言下各一条，附带 hreflang 备用链接
pub fn sitemap_xml(config: &AppConfig, vehicles: &[Vehicle]) -> Result<String> {
    let mut entries: Vec<(String, Option<String>)> = PAGE_SLUGS
        .iter()
        .map(|slug| (page_path(slug).to_string(), None))
        .collect();
    entries.extend(
        vehicles
            .iter()
            .map(|v| (vehicle_path(v), Some(v.updated_at.format("%Y-%m-%d").to_string()))),
    );

    let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    writer
        .create_element("urlset")
        .with_attribute(("xmlns", SITEMAP_NS))
        .with_attribute(("xmlns:xhtml", XHTML_NS))
        .write_inner_content(|writer| {
            for (path, lastmod) in &entries {
                let links = alternates(&config.public_base_url, path);
                for lang in Language::ALL {
                    writer.create_element("url").write_inner_content(|writer| {
                        writer
                            .create_element("loc")
                            .write_text_content(BytesText::new(&localized_url(&config.public_base_url, lang, path)))?;
                        if let Some(lastmod) = lastmod {
                            writer
                                .create_element("lastmod")
                                .write_text_content(BytesText::new(lastmod))?;
                        }
                        for link in &links {
                            writer
                                .create_element("xhtml:link")
                                .with_attribute(("rel", "alternate"))
                                .with_attribute(("hreflang", link.hreflang.as_str()))
                                .with_attribute(("href", link.href.as_str()))
                                .write_empty()?;
                        }
                        Ok::<(), quick_xml::Error>(())
                    })?;
                }
            }
            Ok::<(), quick_xml::Error>(())
        })?;

    let xml = String::from_utf8(writer.into_inner().into_inner())?;
    Ok(xml)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CreateVehicleRequest;

    fn config() -> AppConfig {
        AppConfig {
            public_base_url: "https://rent.example.com".to_string(),
            site_name: "Sea Rent".to_string(),
            booking_phone: "905551112233".to_string(),
            ..AppConfig::default()
        }
    }

    fn bus() -> Vehicle {
        Vehicle::from_create_request(CreateVehicleRequest {
            kind: VehicleKind::Bus,
            brand: "Mercedes".to_string(),
            model: "Sprinter".to_string(),
            year: 2021,
            vehicle_class: "minibus".to_string(),
            price_per_day: 150,
            seats: 18,
            transmission: Some("manual".to_string()),
            fuel: Some("diesel".to_string()),
            image_url: None,
            gallery: Some(vec!["/storage/vehicles/abc.webp".to_string()]),
            description: None,
            popularity: None,
        })
        .unwrap()
    }

    #[test]
    fn test_page_metadata() {
        let meta = page_metadata(&config(), "cars", Language::Ru).unwrap();
        assert_eq!(meta.title, "Автомобили в аренду | Sea Rent");
        assert_eq!(meta.canonical_url, "https://rent.example.com/ru/cars");
        assert_eq!(meta.alternates.len(), 4);
        assert_eq!(
            meta.alternates.last().unwrap(),
            &AlternateLink {
                hreflang: "x-default".to_string(),
                href: "https://rent.example.com/en/cars".to_string(),
            }
        );

        let home = page_metadata(&config(), "home", Language::Tr).unwrap();
        assert_eq!(home.canonical_url, "https://rent.example.com/tr");

        assert!(page_metadata(&config(), "pricing", Language::En).is_none());
    }

    #[test]
    fn test_every_page_has_copy_in_every_language() {
        for slug in PAGE_SLUGS {
            for lang in Language::ALL {
                assert!(page_copy(slug, lang).is_some(), "{} / {}", slug, lang);
            }
        }
    }

    #[test]
    fn test_vehicle_schema() {
        let vehicle = bus();
        let schema = vehicle_schema(&config(), &vehicle, Language::En);

        assert_eq!(schema["@type"], "BusOrCoach");
        assert_eq!(schema["offers"]["price"], 150);
        assert_eq!(schema["offers"]["priceCurrency"], "USD");
        assert_eq!(schema["fuelType"], "diesel");
        assert_eq!(schema["image"], "https://rent.example.com/storage/vehicles/abc.webp");
        assert_eq!(
            schema["url"],
            format!("https://rent.example.com/en/buses/{}", vehicle.slug)
        );
        assert!(schema.get("description").is_none());
    }

    #[test]
    fn test_breadcrumbs() {
        let vehicle = bus();
        let crumbs = vehicle_breadcrumbs(&config(), &vehicle, Language::En);
        let items = crumbs["itemListElement"].as_array().unwrap();
        assert_eq!(items.len(), 3);
        assert_eq!(items[0]["position"], 1);
        assert_eq!(items[1]["name"], "Buses for rent");
        assert_eq!(items[2]["name"], "Mercedes Sprinter");
    }

    #[test]
    fn test_organization_schema() {
        let schema = organization_schema(&config());
        assert_eq!(schema["@type"], "AutoRental");
        assert_eq!(schema["telephone"], "+905551112233");
        assert_eq!(schema["availableLanguage"], json!(["en", "ru", "tr"]));
    }

    #[test]
    fn test_sitemap_xml() {
        let vehicle = bus();
        let xml = sitemap_xml(&config(), std::slice::from_ref(&vehicle)).unwrap();

        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(xml.contains("xmlns:xhtml=\"http://www.w3.org/1999/xhtml\""));
        // 5 个页面 + 1 辆车，每个 3 种语言
        assert_eq!(xml.matches("<url>").count(), 18);
        assert!(xml.contains("<loc>https://rent.example.com/tr/about</loc>"));
        assert!(xml.contains(&format!(
            "<loc>https://rent.example.com/ru/buses/{}</loc>",
            vehicle.slug
        )));
        assert!(xml.contains("hreflang=\"x-default\""));
        assert_eq!(xml.matches("<lastmod>").count(), 3);
    }
}
