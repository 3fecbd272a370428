/// 每个编码单元所占的比特数。
/// 文本先按所选策略编码为字节，每个字节再以最高位在前 (MSB first)
/// 的顺序展开为 8 个比特。
pub const BITS_PER_UNIT: usize = 8;

/// 编码端与解码端事先约定的默认结束标记：8 个零比特。
/// 载荷比特流之后紧跟这段模式，解码端扫描到它即停止读取。
/// 标记始终作为显式参数传入核心函数，而不是隐藏的全局状态。
pub const END_MARKER: [u8; 8] = [0; 8];

/// HTTP API 的默认监听端口。
pub const DEFAULT_PORT: u16 = 3000;

/// multipart 上传体积上限 (32 MiB)。
/// axum 默认的 2 MiB 请求体限制对图像文件来说太小。
pub const MAX_UPLOAD_BYTES: usize = 32 * 1024 * 1024;
