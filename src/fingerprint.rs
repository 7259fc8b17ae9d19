use img_hash::{HashAlg, HasherConfig};
use sha2::{Digest, Sha256};

use crate::evidence::Fingerprint;

/// 证据双指纹：SHA256 管“原始完整性”，pHash 管“内容同一性”。
///
/// 微信/压缩转存后 SHA256 必变而 pHash 相近，两者合用才能同时
/// 识别“调包”和“同图重提”。
///
/// 该函数不失败：pHash 依赖像素解码，解码不了就记 None；
/// SHA256 对任意字节都成立。
pub fn generate_fingerprints(bytes: &[u8]) -> Fingerprint {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    let sha256 = format!("{:x}", hasher.finalize());

    let phash = img_hash::image::load_from_memory(bytes).ok().map(|img| {
        // 梯度算法对明暗整体偏移比均值算法更鲁棒；8x8 = 64 位指纹
        let hasher = HasherConfig::new()
            .hash_alg(HashAlg::Gradient)
            .hash_size(8, 8)
            .to_hasher();
        hasher.hash_image(&img).to_base64()
    });

    Fingerprint { sha256, phash }
}

#[cfg(test)]
mod tests {
    use super::*;
    use img_hash::image::{DynamicImage, ImageOutputFormat};

    fn synthetic_png() -> Vec<u8> {
        let img = DynamicImage::new_rgb8(16, 16);
        let mut buf = Vec::new();
        img.write_to(&mut buf, ImageOutputFormat::Png).unwrap();
        buf
    }

    #[test]
    fn sha256_always_present_even_for_garbage() {
        let fp = generate_fingerprints(b"not an image at all");
        assert_eq!(fp.sha256.len(), 64);
        assert_eq!(fp.phash, None);
    }

    #[test]
    fn decodable_image_gets_a_phash() {
        let fp = generate_fingerprints(&synthetic_png());
        assert_eq!(fp.sha256.len(), 64);
        assert!(fp.phash.is_some());
    }

    #[test]
    fn fingerprints_are_deterministic() {
        let bytes = synthetic_png();
        assert_eq!(generate_fingerprints(&bytes), generate_fingerprints(&bytes));
    }

    #[test]
    fn single_byte_change_avalanches_sha256() {
        let mut bytes = synthetic_png();
        let original = generate_fingerprints(&bytes);
        let last = bytes.len() - 1;
        bytes[last] ^= 0xFF;
        let tampered = generate_fingerprints(&bytes);
        assert_ne!(original.sha256, tampered.sha256);
    }
}
