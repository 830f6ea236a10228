// MMDC (Multi Mode DDR Controller) metrics

crate::metric_enum! {
    pub enum MmdcMetric {
        BusyPercent => "MMDCBusyPercent",
        ReadAccesses => "MMDCReadAccesses",
        WriteAccesses => "MMDCWriteAccesses",
        ReadBytes => "MMDCReadBytes",
        WriteBytes => "MMDCWriteBytes",
        ReadBandwidth => "MMDCReadBandwidth",
        WriteBandwidth => "MMDCWriteBandwidth",
    }
}

crate::metric_enum! {
    /// Binary units used by the pretty reporter, smallest first
    pub enum ByteUnit {
        Bytes => "B",
        KiB => "KiB",
        MiB => "MiB",
        GiB => "GiB",
    }
}

impl ByteUnit {
    /// Next larger unit, `None` past GiB
    pub fn next(&self) -> Option<ByteUnit> {
        match self {
            ByteUnit::Bytes => Some(ByteUnit::KiB),
            ByteUnit::KiB => Some(ByteUnit::MiB),
            ByteUnit::MiB => Some(ByteUnit::GiB),
            ByteUnit::GiB => None,
        }
    }
}
