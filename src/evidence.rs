use serde::{Deserialize, Serialize};

/// 单张证据照片的取证记录 (Forensic Record)
///
/// 由 EXIF 提取器一次性产出，之后不再变更。
/// 所有字段都是空值容忍的：元数据缺失、损坏都不构成错误。
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct GeoForensics {
    // === 地理标签 (Geotag) ===

    // 拍摄点坐标（十进制度）。两者同时存在时 is_geotagged 才为真。
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,

    // 原始拍摄时间 (DateTimeOriginal)，保留 EXIF 原文，不做时区推断
    pub timestamp: Option<String>,

    // === 软件痕迹 (Software Trace) ===

    // Software 标签原文；解析失败/空元数据时为哨兵值（见 exif_guard）
    pub software: Option<String>,

    // 编辑痕迹：命中编辑工具名单，或软件标签存在但相机 Make/Model 双缺
    // （传感器差异，元数据疑似被剥离后重写）
    pub is_edited: bool,

    // 严格由两个坐标的“存在性”导出，0.0 坐标同样算存在
    pub is_geotagged: bool,
}

/// 举报人提交时刻的设备坐标
///
/// 调用方负责兜底：浏览器定位失败时必须自行提供回退坐标。
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct DeviceLocation {
    pub latitude: f64,
    pub longitude: f64,
}

/// 三档可信徽章
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IntegrityBadge {
    Verified,
    Suspicious,
    Unverified,
}

impl IntegrityBadge {
    /// 分数到徽章的唯一映射：>=90 VERIFIED，>=60 SUSPICIOUS，其余 UNVERIFIED
    pub fn for_score(score: i32) -> Self {
        if score >= 90 {
            IntegrityBadge::Verified
        } else if score >= 60 {
            IntegrityBadge::Suspicious
        } else {
            IntegrityBadge::Unverified
        }
    }
}

/// 一次证据核验的最终裁决
///
/// score 从 100 起按固定罚则做加法扣减，不设上下限钳制；
/// 当前罚则组合的可达值域为 {10, 50, 60, 75, 100}，天然落在 [0,100] 内。
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct IntegrityScore {
    pub score: i32,
    pub badge: IntegrityBadge,
    // 人类可读的扣分理由，顺序即罚则应用顺序；满分干净路径为空列表
    pub reasons: Vec<String>,
}

/// 证据字节的物理/视觉双指纹
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Fingerprint {
    // SHA256 (Hex)：任何一个字节的改动都会雪崩，防调包
    pub sha256: String,
    // 梯度 pHash (Base64)：压缩、转存后依然相近；像素不可解码时为 None
    pub phash: Option<String>,
}

/// 完整证据包：一次举报封存的全部取证产物
///
/// 封存后不可变。持久化归外部系统负责，本服务只保证
/// 台账里的摘要与签名能复验到这份记录。
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct EvidenceRecord {
    // === 第一层：物理指纹 (Identity) ===
    pub fingerprint: Fingerprint,

    // === 第二层：取证元数据 (Forensics) ===
    pub forensics: GeoForensics,

    // === 第三层：现场坐标与裁决 (Verdict) ===
    pub device: DeviceLocation,
    pub integrity: IntegrityScore,

    // === 第四层：元数据 (Metadata) ===

    // Unix 时间戳（秒），封存时刻
    pub reported_at: i64,
}

impl EvidenceRecord {
    /// 记录摘要：对 JSON 形态取 blake3，作为封签引用的 32 字节锚点
    pub fn digest(&self) -> anyhow::Result<[u8; 32]> {
        let payload = serde_json::to_vec(self)?;
        Ok(*blake3::hash(&payload).as_bytes())
    }
}

/// 封签裁决：进入签名与台账的规范化载荷
///
/// 刻意不含浮点字段：BCS 没有浮点编码，坐标经由 record_digest 间接锚定。
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SealedVerdict {
    pub record_digest: [u8; 32],
    pub integrity: IntegrityScore,
    pub sealed_at: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn badge_boundaries() {
        assert_eq!(IntegrityBadge::for_score(100), IntegrityBadge::Verified);
        assert_eq!(IntegrityBadge::for_score(90), IntegrityBadge::Verified);
        assert_eq!(IntegrityBadge::for_score(89), IntegrityBadge::Suspicious);
        assert_eq!(IntegrityBadge::for_score(60), IntegrityBadge::Suspicious);
        assert_eq!(IntegrityBadge::for_score(59), IntegrityBadge::Unverified);
        assert_eq!(IntegrityBadge::for_score(0), IntegrityBadge::Unverified);
    }

    #[test]
    fn badge_serializes_screaming() {
        let json = serde_json::to_string(&IntegrityBadge::Verified).unwrap();
        assert_eq!(json, "\"VERIFIED\"");
        let json = serde_json::to_string(&IntegrityBadge::Unverified).unwrap();
        assert_eq!(json, "\"UNVERIFIED\"");
    }

    #[test]
    fn record_digest_is_stable() {
        let record = EvidenceRecord {
            fingerprint: Fingerprint {
                sha256: "00".repeat(32),
                phash: None,
            },
            forensics: GeoForensics {
                latitude: Some(19.076),
                longitude: Some(72.8777),
                timestamp: None,
                software: None,
                is_edited: false,
                is_geotagged: true,
            },
            device: DeviceLocation {
                latitude: 19.076,
                longitude: 72.8777,
            },
            integrity: IntegrityScore {
                score: 100,
                badge: IntegrityBadge::Verified,
                reasons: vec![],
            },
            reported_at: 1_700_000_000,
        };
        assert_eq!(record.digest().unwrap(), record.digest().unwrap());
    }
}
