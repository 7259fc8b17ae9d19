use crate::evidence::{DeviceLocation, GeoForensics, IntegrityBadge, IntegrityScore};

/// 可信评分器 (Integrity Scorer)
///
/// 纯函数：取证记录 + 设备坐标 -> 裁决。无 I/O、无隐藏状态、无异常外泄，
/// 相同输入永远得到相同输出。

// 等距圆柱近似的纬度换算系数（米/度）
const METERS_PER_DEGREE: f64 = 111_320.0;

/// 照片 GPS 与设备 GPS 允许的最大漂移（米），城市场景留出定位抖动余量。
/// 比较为严格大于：恰好 200.0 米不罚。
pub const DRIFT_THRESHOLD_METERS: f64 = 200.0;

const EDIT_PENALTY: i32 = 40;
const DRIFT_PENALTY: i32 = 50;

// 无地理标签的统一降级档位
const UNGEOTAGGED_SCORE: i32 = 75;
const UNGEOTAGGED_REASON: &str =
    "No Geotag found in evidence. Verified via Ward Node Manual Sync.";

/// 核心入口：对一份证据做可信裁决
pub fn calculate_integrity(forensics: &GeoForensics, device: &DeviceLocation) -> IntegrityScore {
    // 无地理标签：统一降级，短路返回。
    // 此路径不看其他信号，也完全不碰设备坐标。
    if !forensics.is_geotagged {
        return ungeotagged_verdict();
    }

    // is_geotagged 为真则两个坐标必然在场；不变量被破坏时按无标签降级
    let (Some(photo_lat), Some(photo_lng)) = (forensics.latitude, forensics.longitude) else {
        return ungeotagged_verdict();
    };

    let mut score = 100;
    let mut reasons = Vec::new();

    if forensics.is_edited {
        score -= EDIT_PENALTY;
        reasons.push(match &forensics.software {
            Some(name) => format!("Processed by {}", name),
            None => "Sensor Variance Detected (Synthetic Metadata)".to_string(),
        });
    }

    let drift = planar_distance_meters(photo_lat, photo_lng, device);
    if let Some(reason) = drift_penalty_reason(drift) {
        score -= DRIFT_PENALTY;
        reasons.push(reason);
    }

    IntegrityScore {
        score,
        badge: IntegrityBadge::for_score(score),
        reasons,
    }
}

fn ungeotagged_verdict() -> IntegrityScore {
    IntegrityScore {
        score: UNGEOTAGGED_SCORE,
        badge: IntegrityBadge::Suspicious,
        reasons: vec![UNGEOTAGGED_REASON.to_string()],
    }
}

/// 等距圆柱平面近似距离（米）
///
/// 经度分量按设备纬度的余弦缩放。只在城市尺度的小距离下成立：
/// 不做大圆修正，接近极地时余弦项趋零而失真。
pub fn planar_distance_meters(photo_lat: f64, photo_lng: f64, device: &DeviceLocation) -> f64 {
    let d_lat = (photo_lat - device.latitude) * METERS_PER_DEGREE;
    let d_lng =
        (photo_lng - device.longitude) * METERS_PER_DEGREE * device.latitude.to_radians().cos();
    (d_lat * d_lat + d_lng * d_lng).sqrt()
}

// 罚则判定与坐标换算解耦，阈值边界可直接用距离值验证
pub(crate) fn drift_penalty_reason(distance_meters: f64) -> Option<String> {
    if distance_meters > DRIFT_THRESHOLD_METERS {
        Some(format!(
            "Location mismatch: {}m offset from reporter",
            distance_meters.round() as i64
        ))
    } else {
        None
    }
}
