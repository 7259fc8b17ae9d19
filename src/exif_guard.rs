use exif::{Exif, In, Rational, Reader, Tag, Value};
use std::io::Cursor;

use crate::evidence::GeoForensics;

/// EXIF 取证提取器 (EXIF Guard)
///
/// **职责**: 把证据照片的原始字节变成一份取证记录。
///
/// **对外永不失败**: 市政举报不能因为元数据读不出来而被拒。
/// 任何内部异常都降级成“来源不明”的空记录，由哨兵 Software 标签区分两种退化：
/// - `CLEAN_GENERIC_BLOB`: 容器无 Exif 块，或有块但目标字段一个都不存在
/// - `FORENSIC_BYPASS`: 容器损坏/格式不支持，解析整体失败

/// 无元数据（而非解析失败）时的哨兵标签
pub const SENTINEL_CLEAN: &str = "CLEAN_GENERIC_BLOB";
/// 解析失败兜底路径的哨兵标签
pub const SENTINEL_BYPASS: &str = "FORENSIC_BYPASS";

// 编辑工具签名名单：大小写敏感的子串匹配
const EDITING_TOOLS: [&str; 6] = [
    "Adobe",
    "Photoshop",
    "Lightroom",
    "GIMP",
    "Canva",
    "Snapseed",
];

/// 核心入口：证据字节 -> 取证记录
pub fn analyze_evidence(bytes: &[u8]) -> GeoForensics {
    match parse_forensics(bytes) {
        Ok(Some(record)) => record,
        Ok(None) => sentinel_record(SENTINEL_CLEAN),
        Err(_) => sentinel_record(SENTINEL_BYPASS),
    }
}

fn parse_forensics(bytes: &[u8]) -> anyhow::Result<Option<GeoForensics>> {
    let exif = match Reader::new().read_from_container(&mut Cursor::new(bytes)) {
        Ok(exif) => exif,
        // 容器有效但没有 Exif 块：属于“干净无痕”，不是解析旁路
        Err(exif::Error::NotFound(_)) => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    let latitude = gps_coordinate(&exif, Tag::GPSLatitude, Tag::GPSLatitudeRef, "S");
    let longitude = gps_coordinate(&exif, Tag::GPSLongitude, Tag::GPSLongitudeRef, "W");
    let software = ascii_field(&exif, Tag::Software);
    let make = ascii_field(&exif, Tag::Make);
    let model = ascii_field(&exif, Tag::Model);
    let timestamp = ascii_field(&exif, Tag::DateTimeOriginal);

    if latitude.is_none()
        && longitude.is_none()
        && software.is_none()
        && make.is_none()
        && model.is_none()
        && timestamp.is_none()
    {
        return Ok(None);
    }

    // 不变量：is_geotagged 当且仅当两个坐标都存在
    let is_geotagged = latitude.is_some() && longitude.is_some();
    let is_edited = edit_signature(software.as_deref(), make.as_deref(), model.as_deref());

    Ok(Some(GeoForensics {
        latitude,
        longitude,
        timestamp,
        software,
        is_edited,
        is_geotagged,
    }))
}

/// 编辑痕迹判定
///
/// 命中工具名单，或出现“传感器差异”——Software 存在而相机 Make/Model 双缺，
/// 对应元数据被部分剥离或重写过的图像。
pub(crate) fn edit_signature(
    software: Option<&str>,
    make: Option<&str>,
    model: Option<&str>,
) -> bool {
    let tool_hit = software
        .map_or(false, |s| EDITING_TOOLS.iter().any(|tool| s.contains(tool)));
    let sensor_variance = software.is_some() && make.is_none() && model.is_none();
    tool_hit || sensor_variance
}

// 哨兵记录不经过编辑判定：哨兵标签本身没有 Make/Model，
// 若走判定会被误报为传感器差异
fn sentinel_record(tag: &str) -> GeoForensics {
    GeoForensics {
        latitude: None,
        longitude: None,
        timestamp: None,
        software: Some(tag.to_string()),
        is_edited: false,
        is_geotagged: false,
    }
}

fn ascii_field(exif: &Exif, tag: Tag) -> Option<String> {
    let field = exif.get_field(tag, In::PRIMARY)?;
    match &field.value {
        Value::Ascii(lines) => {
            let joined = lines
                .iter()
                .map(|line| String::from_utf8_lossy(line))
                .collect::<Vec<_>>()
                .join(" ");
            let trimmed = joined.trim_end_matches('\0').trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        }
        _ => None,
    }
}

fn gps_coordinate(exif: &Exif, value_tag: Tag, ref_tag: Tag, negative_ref: &str) -> Option<f64> {
    let field = exif.get_field(value_tag, In::PRIMARY)?;
    let degrees = match &field.value {
        Value::Rational(parts) => dms_to_degrees(parts)?,
        _ => return None,
    };
    // 半球参照缺失时按正向处理
    let sign = match ascii_field(exif, ref_tag) {
        Some(reference) if reference.starts_with(negative_ref) => -1.0,
        _ => 1.0,
    };
    Some(sign * degrees)
}

// EXIF GPS 坐标是 度/分/秒 三个有理数；分秒可缺省
pub(crate) fn dms_to_degrees(parts: &[Rational]) -> Option<f64> {
    let degrees = parts.first()?.to_f64();
    let minutes = parts.get(1).map_or(0.0, |r| r.to_f64());
    let seconds = parts.get(2).map_or(0.0, |r| r.to_f64());
    Some(degrees + minutes / 60.0 + seconds / 3600.0)
}
