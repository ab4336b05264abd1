#[cfg(test)]
mod allocation_regression_tests {
    use std::io::Write;
    use tempfile::NamedTempFile;

    use atfutil::atf::Allocation;
    use atfutil::atf_loader::{load_atf, read_atf, to_yaml};
    use atfutil::forest::{AllocationForest, MAX_NESTING_DEPTH};
    use atfutil::ip::cidr::{block_size, overlaps};
    use atfutil::ip::{Block, IpNetPool, Ipv4Net, PoolError};

    fn cidr(s: &str) -> Ipv4Net {
        s.parse().expect("CIDR parsing failed")
    }

    /// Pool shapes used by the property checks below
    fn sample_pools() -> Vec<IpNetPool> {
        vec![
            IpNetPool::new("10.42.0.0/24", vec![]).unwrap(),
            IpNetPool::new(
                "10.42.0.0/24",
                vec![cidr("10.42.0.16/28"), cidr("10.42.0.64/28"), cidr("10.42.0.0/30")],
            )
            .unwrap(),
            IpNetPool::new(
                "10.0.0.0/8",
                vec![cidr("10.0.0.0/16"), cidr("10.1.0.0/16"), cidr("10.2.0.0/15")],
            )
            .unwrap(),
            IpNetPool::new(
                "172.16.0.0/12",
                vec![cidr("172.16.5.0/24"), cidr("172.20.0.0/14"), cidr("172.31.255.255/32")],
            )
            .unwrap(),
            IpNetPool::new("0.0.0.0/0", vec![cidr("255.255.255.0/24"), cidr("10.0.0.0/8")]).unwrap(),
        ]
    }

    fn assert_tiles(pool: &IpNetPool, blocks: &[Block]) {
        let superblock = pool.superblock();
        let mut expected_next = u64::from(u32::from(superblock.network()));
        for block in blocks {
            assert_eq!(
                u64::from(u32::from(block.network.network())),
                expected_next,
                "gap or overlap before {} in {}",
                block.network,
                superblock
            );
            assert!(superblock.contains(&block.network));
            expected_next += block_size(&block.network);
        }
        assert_eq!(expected_next, u64::from(u32::from(superblock.broadcast())) + 1, "{} not fully covered", superblock);
    }

    /// Test that the partition exactly tiles the superblock
    #[test]
    fn test_partition_covers_superblock() {
        for pool in sample_pools() {
            let blocks = pool.find_all_blocks();
            assert_tiles(&pool, &blocks);

            let allocated: Vec<Ipv4Net> = blocks.iter().filter(|b| b.allocated).map(|b| b.network).collect();
            assert_eq!(allocated, pool.allocations());
        }
    }

    /// Test that no two adjacent free blocks could merge into one aligned block
    #[test]
    fn test_partition_is_maximal() {
        for pool in sample_pools() {
            let blocks = pool.find_all_blocks();
            for pair in blocks.windows(2) {
                let (a, b) = (pair[0], pair[1]);
                if a.allocated || b.allocated || a.network.prefix_len() != b.network.prefix_len() {
                    continue;
                }
                let merged = Ipv4Net::new(a.network.network(), a.network.prefix_len() - 1)
                    .unwrap()
                    .trunc();
                let mergeable = merged.network() == a.network.network()
                    && merged.prefix_len() > pool.superblock().prefix_len();
                assert!(!mergeable, "{} and {} should have been one block", a.network, b.network);
            }
        }
    }

    /// Test that repeated partitions without mutation are identical
    #[test]
    fn test_partition_is_idempotent() {
        for pool in sample_pools() {
            assert_eq!(pool.find_all_blocks(), pool.find_all_blocks());
        }
    }

    /// Test allocation results and the sortedness of the pool afterwards
    #[test]
    fn test_alloc_correctness() {
        for mut pool in sample_pools() {
            let superblock = *pool.superblock();
            for size in [28u8, 30, 26, 29, 28, 24] {
                if size <= superblock.prefix_len() {
                    continue;
                }
                let before: Vec<Ipv4Net> = pool.allocations().to_vec();
                let network = match pool.alloc(size) {
                    Ok(network) => network,
                    Err(PoolError::NoSpaceAvailable { .. }) => continue,
                    Err(e) => panic!("unexpected error {}", e),
                };

                assert_eq!(network.prefix_len(), size);
                assert!(superblock.contains(&network));
                assert!(before.iter().all(|prior| !overlaps(prior, &network)));

                let firsts: Vec<u32> = pool.allocations().iter().map(|n| u32::from(n.network())).collect();
                let mut sorted = firsts.clone();
                sorted.sort_unstable();
                assert_eq!(firsts, sorted);

                let blocks = pool.find_all_blocks();
                assert!(blocks.iter().any(|b| b.allocated && b.network == network));
                assert_tiles(&pool, &blocks);
            }
        }
    }

    /// Test that identical pools always place a request in the same block
    #[test]
    fn test_alloc_is_deterministic() {
        for pool in sample_pools() {
            let mut a = pool.clone();
            let mut b = pool.clone();
            for _ in 0..5 {
                assert_eq!(a.alloc(29).ok(), b.alloc(29).ok());
            }
        }

        // Two equally tight /27 holes: the lower address wins
        let mut pool = IpNetPool::new(
            "10.42.0.0/24",
            vec![
                cidr("10.42.0.0/26"),
                cidr("10.42.0.96/27"),
                cidr("10.42.0.160/27"),
                cidr("10.42.0.192/26"),
            ],
        )
        .unwrap();
        assert_eq!(pool.alloc(28).unwrap(), cidr("10.42.0.64/28"));
        assert_eq!(pool.alloc(27).unwrap(), cidr("10.42.0.128/27"));
    }

    /// Test the end-to-end path from a table file to a new allocation
    #[test]
    fn test_table_file_allocation() {
        let yaml = r#"
name: vpc
superBlock: 10.0.0.0/8
allocations:
  - cidr: 10.0.0.0/16
    description: a
  - cidr: 10.1.0.0/16
    description: b
  - cidr: 10.2.0.0/15
    description: c
"#;
        let mut temp_file = NamedTempFile::new().unwrap();
        write!(temp_file, "{}", yaml).unwrap();

        let mut atf = load_atf(temp_file.path()).unwrap();
        let forest = AllocationForest::from_atf(&atf).unwrap();
        let mut pool = forest.root().clone();

        for i in 4..104 {
            let network = pool.alloc(16).unwrap();
            assert_eq!(network.to_string(), format!("10.{}.0.0/16", i));
            atf.allocations.push(Allocation::new(network, format!("team {}", i)));
        }

        let reloaded = read_atf(to_yaml(&atf).unwrap().as_bytes()).unwrap();
        let forest = AllocationForest::from_atf(&reloaded).unwrap();
        assert_eq!(forest.root().allocations().len(), 103);
    }

    /// Test the error taxonomy surfaced to callers
    #[test]
    fn test_user_facing_errors() {
        assert!(matches!(
            IpNetPool::new("10.42.0.1/24", vec![]),
            Err(PoolError::InvalidSuperblock { .. })
        ));
        assert!(matches!(
            IpNetPool::new("127.0.0.1/32", vec![cidr("10.10.10.0/24")]),
            Err(PoolError::InvalidSuperblock { .. })
        ));
        assert!(matches!(
            IpNetPool::new(
                "10.42.0.0/24",
                vec![cidr("10.42.0.0/26"), cidr("10.42.0.64/26"), cidr("10.42.0.0/25")]
            ),
            Err(PoolError::OverlapOrOutOfBounds(_))
        ));

        let mut pool = IpNetPool::new("10.0.0.0/12", vec![]).unwrap();
        assert_eq!(pool.alloc(8), Err(PoolError::NoSpaceAvailable { prefix_len: 8 }));
        assert_eq!(pool.alloc(40), Err(PoolError::InvalidPrefixLength { prefix_len: 40 }));
        assert!(pool.allocations().is_empty());

        let yaml = r#"
superBlock: 10.0.0.0/16
allocations:
  - cidr: 10.0.0.0/24
    subAllocations:
      - cidr: 10.0.0.0/25
        subAllocations:
          - cidr: 10.0.0.0/26
"#;
        let atf = read_atf(yaml.as_bytes()).unwrap();
        assert!(matches!(
            AllocationForest::from_atf(&atf),
            Err(PoolError::NestingTooDeep { max_depth: MAX_NESTING_DEPTH, .. })
        ));
    }
}
