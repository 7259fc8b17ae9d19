use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use rand::rngs::OsRng;
use std::fs;
use std::path::Path;

use crate::evidence::SealedVerdict;

/// 裁决签名器
///
/// 对封签裁决做 Ed25519 确证，公钥即服务身份，分发给审计方验签。
pub struct VerdictSigner {
    keypair: SigningKey,
}

impl VerdictSigner {
    /// 从种子文件加载身份；文件不存在时生成新密钥并落盘。
    ///
    /// 种子固定 32 字节。生产部署应改由 HSM/安全存储供给，
    /// 文件形态只覆盖单节点场景。
    pub fn load_or_generate(path: &str) -> anyhow::Result<Self> {
        if Path::new(path).exists() {
            let bytes = fs::read(path)?;
            let seed: [u8; 32] = bytes
                .as_slice()
                .try_into()
                .map_err(|_| anyhow::anyhow!("密钥文件 {} 长度非法: {} 字节", path, bytes.len()))?;
            Ok(Self {
                keypair: SigningKey::from_bytes(&seed),
            })
        } else {
            let keypair = SigningKey::generate(&mut OsRng);
            fs::write(path, keypair.to_bytes())?;
            Ok(Self { keypair })
        }
    }

    /// 服务身份公钥
    pub fn public_key(&self) -> VerifyingKey {
        self.keypair.verifying_key()
    }

    /// 对封签裁决签名，返回 64 字节 Ed25519 签名
    ///
    /// 载荷用 BCS 定序编码：同一裁决永远得到同一字节序。
    /// JSON 不保证字段顺序稳定，不能作为签名载荷。
    pub fn sign(&self, verdict: &SealedVerdict) -> anyhow::Result<Signature> {
        let payload = bcs::to_bytes(verdict)?;
        Ok(self.keypair.sign(&payload))
    }

    /// 静态验签入口（给外部审计方使用）
    pub fn verify(
        verification_key: &VerifyingKey,
        verdict: &SealedVerdict,
        signature: &Signature,
    ) -> anyhow::Result<bool> {
        let payload = bcs::to_bytes(verdict)?;
        Ok(verification_key.verify(&payload, signature).is_ok())
    }
}
