use ckb_merkle_mountain_range::{
    Error as MmrError, MMRStore, Merge, MerkleProof, Result as MmrResult, MMR,
};

use crate::evidence::{EvidenceRecord, SealedVerdict};

/// 证据台账 (Evidence Ledger)
///
/// **职责**: 按提交顺序存储每份封签裁决的叶子哈希，并对外开具
/// 不可篡改的存在性证明。
///
/// 结构选用 MMR (Merkle Mountain Range)：只追加、不改写历史，
/// 新叶子落地即自动合并出新的全局 Root。审计方拿到某次存证的
/// Merkle Proof 后，无需信任本服务即可回放验证
/// `Hash(left || right)` 链条直至 Root。

/// 合并策略：父节点 = blake3(左孩子 || 右孩子)
pub struct MergeBlake3;

impl Merge for MergeBlake3 {
    type Item = [u8; 32];

    fn merge(lhs: &Self::Item, rhs: &Self::Item) -> MmrResult<Self::Item> {
        let mut hasher = blake3::Hasher::new();
        hasher.update(lhs);
        hasher.update(rhs);
        Ok(*hasher.finalize().as_bytes())
    }
}

// sled 默认树里的元数据键：MMR 尺寸。
// 这是位运算路由的坐标系，丢了它整棵树无从定位山峰。
const META_MMR_SIZE: &[u8] = b"mmr_size";

/// MMR 节点的 sled 持久化适配：位置 (大端 u64) -> 32 字节哈希
pub struct SledNodeStore {
    tree: sled::Tree,
}

impl MMRStore<[u8; 32]> for &SledNodeStore {
    fn get_elem(&self, pos: u64) -> MmrResult<Option<[u8; 32]>> {
        let found = self
            .tree
            .get(pos.to_be_bytes())
            .map_err(|e| MmrError::StoreError(e.to_string()))?;
        Ok(found.and_then(|raw| raw.as_ref().try_into().ok()))
    }

    fn append(&mut self, pos: u64, elems: Vec<[u8; 32]>) -> MmrResult<()> {
        for (offset, elem) in elems.into_iter().enumerate() {
            self.tree
                .insert((pos + offset as u64).to_be_bytes(), &elem[..])
                .map_err(|e| MmrError::StoreError(e.to_string()))?;
        }
        Ok(())
    }
}

/// 台账本体：MMR 节点树 + 完整记录树 + 尺寸元数据，同库持久化
pub struct EvidenceLedger {
    db: sled::Db,
    nodes: SledNodeStore,
    records: sled::Tree,
    mmr_size: u64,
}

impl EvidenceLedger {
    /// 打开（或新建）台账，从磁盘恢复 MMR 尺寸
    pub fn open(path: &str) -> anyhow::Result<Self> {
        let db = sled::open(path)?;
        let nodes = SledNodeStore {
            tree: db.open_tree("mmr_nodes")?,
        };
        let records = db.open_tree("records")?;
        let mmr_size = db
            .get(META_MMR_SIZE)?
            .and_then(|raw| raw.as_ref().try_into().ok())
            .map(u64::from_be_bytes)
            .unwrap_or(0);
        Ok(Self {
            db,
            nodes,
            records,
            mmr_size,
        })
    }

    /// 封签裁决的叶子哈希：blake3 over BCS 定序载荷
    pub fn leaf_hash(verdict: &SealedVerdict) -> anyhow::Result<[u8; 32]> {
        let payload = bcs::to_bytes(verdict)?;
        Ok(*blake3::hash(&payload).as_bytes())
    }

    /// 核心功能：裁决入账
    ///
    /// 叶子只存 32 字节哈希，完整记录另存记录树供审计回取。
    /// 返回 (最新全局 Root, 叶子位置)；叶子位置就是存证回执号。
    pub fn append(
        &mut self,
        verdict: &SealedVerdict,
        record: &EvidenceRecord,
    ) -> anyhow::Result<([u8; 32], u64)> {
        let leaf = Self::leaf_hash(verdict)?;

        let mut mmr = MMR::<[u8; 32], MergeBlake3, _>::new(self.mmr_size, &self.nodes);
        let pos = mmr
            .push(leaf)
            .map_err(|e| anyhow::anyhow!("MMR append error: {}", e))?;
        let root = mmr
            .get_root()
            .map_err(|e| anyhow::anyhow!("MMR get_root error: {}", e))?;
        let new_size = mmr.mmr_size();

        // push 只写内存批次，commit 才把节点刷进 sled
        mmr.commit()
            .map_err(|e| anyhow::anyhow!("MMR commit error: {}", e))?;

        self.records
            .insert(pos.to_be_bytes(), serde_json::to_vec(record)?)?;
        self.db.insert(META_MMR_SIZE, &new_size.to_be_bytes()[..])?;
        self.mmr_size = new_size;
        self.db.flush()?;

        Ok((root, pos))
    }

    /// 开具存在性证明，审计方凭 (位置, 叶子哈希, Root) 独立复验
    pub fn get_proof(
        &self,
        pos_list: Vec<u64>,
    ) -> anyhow::Result<MerkleProof<[u8; 32], MergeBlake3>> {
        let mmr = MMR::<[u8; 32], MergeBlake3, _>::new(self.mmr_size, &self.nodes);
        mmr.gen_proof(pos_list)
            .map_err(|e| anyhow::anyhow!("MMR gen_proof error: {}", e))
    }

    /// 按叶子位置回取完整证据记录
    pub fn get_record(&self, pos: u64) -> anyhow::Result<Option<EvidenceRecord>> {
        match self.records.get(pos.to_be_bytes())? {
            Some(raw) => Ok(Some(serde_json::from_slice(&raw)?)),
            None => Ok(None),
        }
    }

    /// 当前 MMR 尺寸（节点数，不是叶子数）
    pub fn mmr_size(&self) -> u64 {
        self.mmr_size
    }
}
